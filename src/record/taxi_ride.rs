use chrono::NaiveDateTime;
use serde::Serialize;

use super::types::ParseError;
use super::{parse_field, parse_time, split_line, ReplayRecord};

const FIELD_COUNT: usize = 14;

/// One taxi trip, parsed from a `trip_data` CSV line.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxiRide {
    pub medallion: i64,
    pub hack_license: i64,
    pub vendor_id: String,
    pub rate_code: i32,
    pub store_and_forward_flag: String,
    pub pickup_time: NaiveDateTime,
    pub dropoff_time: NaiveDateTime,
    pub passenger_count: i32,
    pub trip_time_in_seconds: f32,
    pub trip_distance_in_miles: f32,
    pub pickup_lon: f32,
    pub pickup_lat: f32,
    pub dropoff_lon: f32,
    pub dropoff_lat: f32,
}

impl ReplayRecord for TaxiRide {
    const NAME: &'static str = "TaxiRide";

    fn parse(line: &str) -> Result<Self, ParseError> {
        let tokens = split_line(line, FIELD_COUNT)?;

        // Coordinates are frequently absent in the source data; they fall
        // back to 0.0 instead of failing the record.
        let coordinate = |token: &str| token.trim().parse().unwrap_or(0.0f32);

        Ok(TaxiRide {
            medallion: parse_field(tokens[0], "medallion")?,
            hack_license: parse_field(tokens[1], "hack_license")?,
            vendor_id: tokens[2].trim().to_string(),
            rate_code: parse_field(tokens[3], "rate_code")?,
            store_and_forward_flag: tokens[4].trim().to_string(),
            pickup_time: parse_time(tokens[5], "pickup_time")?,
            dropoff_time: parse_time(tokens[6], "dropoff_time")?,
            passenger_count: parse_field(tokens[7], "passenger_count")?,
            trip_time_in_seconds: parse_field(tokens[8], "trip_time_in_seconds")?,
            trip_distance_in_miles: parse_field(tokens[9], "trip_distance_in_miles")?,
            pickup_lon: coordinate(tokens[10]),
            pickup_lat: coordinate(tokens[11]),
            dropoff_lon: coordinate(tokens[12]),
            dropoff_lat: coordinate(tokens[13]),
        })
    }

    fn partition_key(&self) -> String {
        format!("{}_{}_{}", self.medallion, self.hack_license, self.vendor_id)
    }
}
