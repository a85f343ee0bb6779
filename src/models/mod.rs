// Domain models
// Normalized shapes of upstream records plus the chat, rewards, events and tools entities

pub mod chat;
pub mod clock;
pub mod course;
pub mod event;
pub mod reward;
pub mod student;
pub mod tools;

pub use chat::{BotType, ChatMessage, ChatRole, ChatSession, SessionPreview};
pub use course::{
    Assignment, Course, CourseAnnouncement, CourseContent, GradeRecord, GradeSummary,
};
pub use event::{CampusEvent, EventDetails, EventRegistration, UserEventRegistration};
pub use reward::{
    ACTIVITY_COMPLETED, Activity, ActivityRegistration, EarnedPoints, PointsBalance, Reward,
    RewardRedemption,
};
pub use student::{
    Announcement, AttendanceRecord, ScheduleEntry, SessionType, StudentProfile, WeeklySchedule,
    classes_on, group_by_day,
};
pub use tools::{NewPrintJob, NewRoomBooking, PrintJob, RoomBooking};
