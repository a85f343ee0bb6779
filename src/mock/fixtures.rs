//! Fixture data served in mock mode
//! Relative dates are computed at call time so the demo data never goes stale

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};

use crate::models::{
    Activity, Announcement, Assignment, AttendanceRecord, CampusEvent, Course, CourseAnnouncement,
    CourseContent, GradeRecord, Reward, ScheduleEntry, SessionType, StudentProfile,
};

/// Fixture student login identity
#[derive(Debug, Clone)]
pub struct MockStudent {
    pub user_id: &'static str,
    pub student_id: &'static str,
    pub email: &'static str,
    pub first_name: &'static str,
    pub last_name: &'static str,
    pub program: &'static str,
    pub year: u8,
    pub gpa: f64,
    pub credits_completed: u32,
    pub total_credits: u32,
    pub expected_graduation: (i32, u32, u32),
}

pub const STARTING_POINTS: i32 = 150;

pub const STUDENTS: [MockStudent; 3] = [
    MockStudent {
        user_id: "user-001",
        student_id: "STU2024001",
        email: "john.doe@aivancity.edu",
        first_name: "John",
        last_name: "Doe",
        program: "Computer Science",
        year: 3,
        gpa: 3.8,
        credits_completed: 90,
        total_credits: 120,
        expected_graduation: (2025, 6, 15),
    },
    MockStudent {
        user_id: "user-002",
        student_id: "STU2024002",
        email: "jane.smith@aivancity.edu",
        first_name: "Jane",
        last_name: "Smith",
        program: "Data Science",
        year: 2,
        gpa: 3.9,
        credits_completed: 60,
        total_credits: 120,
        expected_graduation: (2026, 6, 15),
    },
    MockStudent {
        user_id: "user-003",
        student_id: "STU2024003",
        email: "alex.johnson@aivancity.edu",
        first_name: "Alex",
        last_name: "Johnson",
        program: "Artificial Intelligence",
        year: 1,
        gpa: 3.5,
        credits_completed: 30,
        total_credits: 120,
        expected_graduation: (2027, 6, 15),
    },
];

/// Looks a fixture student up by student id
pub fn find_student(student_id: &str) -> Option<&'static MockStudent> {
    STUDENTS.iter().find(|s| s.student_id == student_id)
}

impl MockStudent {
    pub fn profile(&self) -> StudentProfile {
        let (y, m, d) = self.expected_graduation;
        StudentProfile {
            student_id: self.student_id.to_string(),
            first_name: self.first_name.to_string(),
            last_name: self.last_name.to_string(),
            email: self.email.to_string(),
            program: self.program.to_string(),
            year: self.year,
            gpa: Some(self.gpa),
            credits_completed: Some(self.credits_completed),
            total_credits: Some(self.total_credits),
            expected_graduation: NaiveDate::from_ymd_opt(y, m, d),
        }
    }
}

pub struct MockCourse {
    pub id: &'static str,
    pub code: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub professor: &'static str,
}

pub const COURSES: [MockCourse; 5] = [
    MockCourse {
        id: "course-001",
        code: "CS301",
        name: "Advanced Algorithms",
        description: "Study of advanced algorithmic techniques including dynamic programming, greedy algorithms, and graph algorithms.",
        professor: "Dr. Sarah Williams",
    },
    MockCourse {
        id: "course-002",
        code: "DS201",
        name: "Machine Learning Fundamentals",
        description: "Introduction to supervised and unsupervised learning, neural networks, and model evaluation.",
        professor: "Prof. Michael Chen",
    },
    MockCourse {
        id: "course-003",
        code: "AI401",
        name: "Deep Learning",
        description: "Advanced topics in deep learning including CNNs, RNNs, transformers, and GANs.",
        professor: "Dr. Emily Rodriguez",
    },
    MockCourse {
        id: "course-004",
        code: "CS202",
        name: "Database Systems",
        description: "Relational databases, SQL, NoSQL, database design, and optimization.",
        professor: "Prof. David Lee",
    },
    MockCourse {
        id: "course-005",
        code: "DS301",
        name: "Data Visualization",
        description: "Principles and techniques for effective data visualization and storytelling.",
        professor: "Dr. Lisa Anderson",
    },
];

/// Resolves either a course id or a course code
pub fn find_course(id_or_code: &str) -> Option<&'static MockCourse> {
    COURSES
        .iter()
        .find(|c| c.id == id_or_code || c.code == id_or_code)
}

fn utc(y: i32, m: u32, d: u32) -> Option<DateTime<Utc>> {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).single()
}

pub fn courses() -> Vec<Course> {
    COURSES
        .iter()
        .map(|c| Course {
            id: c.id.to_string(),
            course_id: c.code.to_string(),
            name: c.name.to_string(),
            description: Some(c.description.to_string()),
            role: "Student".to_string(),
            enrollment_date: utc(2024, 9, 1),
            available: true,
        })
        .collect()
}

pub fn course_content() -> Vec<CourseContent> {
    [
        ("content-001", "Week 1: Introduction", "Course overview and syllabus", 1, 1),
        ("content-002", "Week 2: Fundamentals", "Core concepts and principles", 2, 8),
        ("content-003", "Week 3: Advanced Topics", "Deep dive into advanced concepts", 3, 15),
    ]
    .into_iter()
    .map(|(id, title, description, position, day)| CourseContent {
        id: id.to_string(),
        title: title.to_string(),
        description: Some(description.to_string()),
        body: None,
        position,
        has_children: true,
        available: true,
        created: utc(2024, 9, day),
        modified: utc(2024, 9, day),
    })
    .collect()
}

/// Assignments for the course; an unknown course yields every assignment
pub fn assignments(course_id: &str) -> Vec<Assignment> {
    let now = Utc::now();
    let course = find_course(course_id);

    [
        ("assign-001", "CS301", "Dynamic Programming Assignment", "Implement solutions to classic DP problems.", 5, 100.0),
        ("assign-002", "DS201", "ML Model Training", "Train and evaluate a classification model on the provided dataset.", 10, 150.0),
        ("assign-003", "CS202", "Database Design Project", "Design and implement a normalized database schema.", 15, 120.0),
    ]
    .into_iter()
    .filter(|(_, code, ..)| course.is_none_or(|c| c.code == *code))
    .map(|(id, _, name, description, due_in_days, points)| Assignment {
        id: id.to_string(),
        content_id: Some(id.to_string()),
        name: name.to_string(),
        description: Some(description.to_string()),
        due: Some(now + Duration::days(due_in_days)),
        points,
        created: Some(now - Duration::days(30)),
        available: true,
    })
    .collect()
}

/// Grade records for the course; an unknown course yields every record
pub fn grades(course_id: &str) -> Vec<GradeRecord> {
    let modified = Utc::now() - Duration::days(7);
    let course = find_course(course_id);

    [
        ("CS301", "Advanced Algorithms", 88.0, "A-"),
        ("DS201", "Machine Learning Fundamentals", 92.0, "A"),
        ("CS202", "Database Systems", 85.0, "B+"),
        ("DS301", "Data Visualization", 95.0, "A"),
    ]
    .into_iter()
    .filter(|(code, ..)| course.is_none_or(|c| c.code == *code))
    .map(|(code, name, score, letter)| GradeRecord {
        column_id: format!("col-{}", code),
        column_name: name.to_string(),
        score: Some(score),
        possible: 100.0,
        text: Some(letter.to_string()),
        feedback: Some("Good work! Keep it up.".to_string()),
        exempt: false,
        modified: Some(modified),
    })
    .collect()
}

pub fn course_announcements() -> Vec<CourseAnnouncement> {
    let three_days_ago = Utc::now() - Duration::days(3);
    vec![
        CourseAnnouncement {
            id: "bb-ann-001".into(),
            title: "Welcome to the Course!".into(),
            body: Some("Welcome everyone! Looking forward to a great semester.".into()),
            created: utc(2024, 9, 1),
            modified: utc(2024, 9, 1),
            creator: Some("Dr. Sarah Williams".into()),
        },
        CourseAnnouncement {
            id: "bb-ann-002".into(),
            title: "Office Hours Update".into(),
            body: Some("Office hours this week will be moved to Thursday 2-4 PM.".into()),
            created: Some(three_days_ago),
            modified: Some(three_days_ago),
            creator: Some("Dr. Sarah Williams".into()),
        },
    ]
}

pub fn schedule() -> Vec<ScheduleEntry> {
    [
        ("CS301", "Advanced Algorithms", 0, "09:00", "10:30", "Room 301", "Building A", "Dr. Sarah Williams", SessionType::Lecture),
        ("CS301", "Advanced Algorithms", 2, "14:00", "16:00", "Lab 102", "Building B", "Dr. Sarah Williams", SessionType::Lab),
        ("DS201", "Machine Learning Fundamentals", 1, "10:00", "11:30", "Room 205", "Building A", "Prof. Michael Chen", SessionType::Lecture),
        ("DS201", "Machine Learning Fundamentals", 3, "15:00", "17:00", "Lab 201", "Building C", "Prof. Michael Chen", SessionType::Lab),
        ("CS202", "Database Systems", 0, "14:00", "15:30", "Room 401", "Building A", "Prof. David Lee", SessionType::Lecture),
        ("DS301", "Data Visualization", 4, "09:00", "11:00", "Room 302", "Building B", "Dr. Lisa Anderson", SessionType::Workshop),
    ]
    .into_iter()
    .map(
        |(code, name, day, start, end, room, building, professor, session_type)| ScheduleEntry {
            course_code: code.to_string(),
            course_name: name.to_string(),
            day_of_week: day,
            start_time: start.to_string(),
            end_time: end.to_string(),
            room: room.to_string(),
            building: building.to_string(),
            professor: professor.to_string(),
            session_type,
        },
    )
    .collect()
}

pub fn attendance() -> Vec<AttendanceRecord> {
    [
        ("CS301", "Advanced Algorithms", 24, 22, 91.67),
        ("DS201", "Machine Learning Fundamentals", 24, 24, 100.0),
        ("CS202", "Database Systems", 20, 18, 90.0),
        ("DS301", "Data Visualization", 16, 15, 93.75),
    ]
    .into_iter()
    .map(|(code, name, total, attended, percentage)| AttendanceRecord {
        course_code: code.to_string(),
        course_name: name.to_string(),
        total_classes: total,
        attended,
        percentage,
    })
    .collect()
}

pub fn announcements() -> Vec<Announcement> {
    let now = Utc::now();
    [
        ("ann-001", "Campus Closure - Holiday Break", "The campus will be closed from December 20th to January 5th for winter break. Happy holidays!", "general", 2, "high"),
        ("ann-002", "Library Extended Hours During Finals", "The library will be open 24/7 during the final exam period (Dec 10-20).", "academic", 5, "medium"),
        ("ann-003", "New AI Lab Equipment Available", "State-of-the-art GPU servers are now available for student research projects. Book your time slot online.", "facilities", 1, "medium"),
    ]
    .into_iter()
    .map(|(id, title, content, category, days_ago, priority)| Announcement {
        id: id.to_string(),
        title: title.to_string(),
        content: content.to_string(),
        category: category.to_string(),
        published_date: now - Duration::days(days_ago),
        expiry_date: None,
        priority: priority.to_string(),
    })
    .collect()
}

pub fn rewards() -> Vec<Reward> {
    [
        ("reward-001", "Free Coffee Voucher", "5 free coffees at campus café", 50, "☕"),
        ("reward-002", "Priority Course Registration", "Register for courses 24 hours early", 100, "📚"),
        ("reward-003", "Extended Library Access", "1 month of 24/7 library access", 75, "📖"),
        ("reward-004", "Campus Merch", "Exclusive Aivancity hoodie", 150, "👕"),
    ]
    .into_iter()
    .map(|(id, name, description, points_cost, icon)| Reward {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        points_cost,
        icon: icon.to_string(),
        available: true,
    })
    .collect()
}

fn days_ahead(days: i64) -> NaiveDate {
    (Utc::now() + Duration::days(days)).date_naive()
}

fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or_default()
}

pub fn events() -> Vec<CampusEvent> {
    [
        ("event-001", "AI Research Symposium", "Annual symposium featuring cutting-edge AI research from students and faculty.", "academic", 7, (9, 0), (17, 0), "Main Auditorium", 200, 50),
        ("event-002", "Hackathon 2024", "48-hour coding competition with prizes and networking opportunities.", "competition", 14, (18, 0), (18, 0), "Innovation Lab", 100, 100),
        ("event-003", "Career Fair", "Meet with top tech companies and explore internship opportunities.", "career", 21, (10, 0), (16, 0), "Sports Hall", 500, 30),
        ("event-004", "Wellness Workshop: Stress Management", "Learn techniques to manage academic stress and maintain mental health.", "wellness", 3, (14, 0), (16, 0), "Wellness Center", 30, 20),
        ("event-005", "International Food Festival", "Celebrate diversity with food from around the world.", "social", 10, (12, 0), (15, 0), "Campus Courtyard", 300, 15),
    ]
    .into_iter()
    .map(
        |(id, name, description, event_type, in_days, start, end, location, max_attendees, ai_points)| {
            CampusEvent {
                id: id.to_string(),
                name: name.to_string(),
                description: description.to_string(),
                event_type: event_type.to_string(),
                date: days_ahead(in_days),
                start_time: hm(start.0, start.1),
                end_time: hm(end.0, end.1),
                location: location.to_string(),
                max_attendees: Some(max_attendees),
                ai_points,
            }
        },
    )
    .collect()
}

pub fn activities() -> Vec<Activity> {
    [
        ("activity-001", "Study Group Session", "Participate in a peer-led study group", "study_group", 10, 2),
        ("activity-002", "Research Paper Presentation", "Present your research at the symposium", "academic", 50, 7),
        ("activity-003", "Volunteer at Career Fair", "Help organize and run the career fair", "volunteer", 30, 21),
    ]
    .into_iter()
    .map(|(id, name, description, category, points, in_days)| Activity {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        category: category.to_string(),
        points,
        date: days_ahead(in_days),
        status: "upcoming".to_string(),
    })
    .collect()
}
