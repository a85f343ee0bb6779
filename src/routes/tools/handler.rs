use axum::extract::{Extension, Json, State};

use crate::{
    AppState,
    auth::Claims,
    error::AppResult,
    models::{NewPrintJob, NewRoomBooking, PrintJob, RoomBooking},
    result::ApiResult,
    utils::success_to_api_response,
};

pub async fn book_room(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
    Json(req): Json<NewRoomBooking>,
) -> AppResult<Json<ApiResult<RoomBooking>>> {
    let booking = state.tools.book_room(&claims.sub, &req).await?;
    Ok(success_to_api_response(booking))
}

pub async fn my_bookings(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
) -> AppResult<Json<ApiResult<Vec<RoomBooking>>>> {
    let bookings = state.tools.bookings(&claims.sub).await?;
    Ok(success_to_api_response(bookings))
}

pub async fn submit_print_job(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
    Json(req): Json<NewPrintJob>,
) -> AppResult<Json<ApiResult<PrintJob>>> {
    let job = state.tools.submit_print_job(&claims.sub, &req).await?;
    Ok(success_to_api_response(job))
}

pub async fn my_print_jobs(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
) -> AppResult<Json<ApiResult<Vec<PrintJob>>>> {
    let jobs = state.tools.print_jobs(&claims.sub).await?;
    Ok(success_to_api_response(jobs))
}
