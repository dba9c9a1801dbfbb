// Handlers for the trip page API. Each call is a thin read over the store.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use shared::{ApiError, Profile, Stop, TripPayload};

use crate::error::{api_error, TripApiError};
use crate::AppState;

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ApiError>)>;

/// Trip ids are positive integers; anything else is a client error.
pub fn parse_trip_id(raw: &str) -> Result<i64, TripApiError> {
    match raw.trim().parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(TripApiError::InvalidTripId(raw.to_string())),
    }
}

fn parse_user_id(raw: &str) -> Result<i64, TripApiError> {
    match raw.trim().parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(TripApiError::InvalidUserId(raw.to_string())),
    }
}

/// GET /api/trip/:id - trip, ordered stops with POIs, and owner profile
pub async fn get_trip(State(state): State<AppState>, Path(raw_id): Path<String>) -> ApiResult<TripPayload> {
    load_trip(&state, &raw_id).await.map(Json).map_err(api_error)
}

async fn load_trip(state: &AppState, raw_id: &str) -> Result<TripPayload, TripApiError> {
    let id = parse_trip_id(raw_id)?;
    let trip = state
        .store
        .fetch_trip(id)
        .await?
        .ok_or(TripApiError::TripNotFound(id))?;

    let stops = state.store.fetch_stops_with_pois(id).await?;
    let profile = state.store.fetch_profile(trip.user_id).await?;
    if profile.is_none() {
        tracing::warn!(trip_id = id, user_id = trip.user_id, "trip owner has no profile");
    }

    tracing::info!(trip_id = id, stops = stops.len(), "trip fetched");
    Ok(TripPayload {
        message: "Trip fetched successfully".to_string(),
        trip,
        stops,
        profile,
    })
}

/// GET /api/trip/:id/stops - ordered stops with POIs
pub async fn get_trip_stops(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> ApiResult<Vec<Stop>> {
    let result: Result<Vec<Stop>, TripApiError> = async {
        let id = parse_trip_id(&raw_id)?;
        if state.store.fetch_trip(id).await?.is_none() {
            return Err(TripApiError::TripNotFound(id));
        }
        Ok(state.store.fetch_stops_with_pois(id).await?)
    }
    .await;

    result.map(Json).map_err(api_error)
}

/// GET /api/profile/:user_id
pub async fn get_profile(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> ApiResult<Profile> {
    let result: Result<Profile, TripApiError> = async {
        let user_id = parse_user_id(&raw_id)?;
        state
            .store
            .fetch_profile(user_id)
            .await?
            .ok_or(TripApiError::ProfileNotFound(user_id))
    }
    .await;

    result.map(Json).map_err(api_error)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_positive_ids_only() {
        assert_eq!(parse_trip_id("12").unwrap(), 12);
        assert_eq!(parse_trip_id(" 7 ").unwrap(), 7);
        assert!(matches!(
            parse_trip_id("0"),
            Err(TripApiError::InvalidTripId(_))
        ));
        assert!(parse_trip_id("-3").is_err());
        assert!(parse_trip_id("paris").is_err());
        assert!(parse_trip_id("").is_err());
    }
}
