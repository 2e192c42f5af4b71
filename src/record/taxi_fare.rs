use chrono::NaiveDateTime;
use serde::Serialize;

use super::types::ParseError;
use super::{parse_field, parse_time, split_line, ReplayRecord};

const FIELD_COUNT: usize = 11;

/// One trip's fare breakdown, parsed from a `trip_fare` CSV line.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxiFare {
    pub medallion: i64,
    pub hack_license: i64,
    pub vendor_id: String,
    pub pickup_time: NaiveDateTime,
    pub payment_type: String,
    pub fare_amount: f32,
    pub surcharge: f32,
    pub mta_tax: f32,
    pub tip_amount: f32,
    pub tolls_amount: f32,
    pub total_amount: f32,
}

impl ReplayRecord for TaxiFare {
    const NAME: &'static str = "TaxiFare";

    fn parse(line: &str) -> Result<Self, ParseError> {
        let tokens = split_line(line, FIELD_COUNT)?;

        Ok(TaxiFare {
            medallion: parse_field(tokens[0], "medallion")?,
            hack_license: parse_field(tokens[1], "hack_license")?,
            vendor_id: tokens[2].trim().to_string(),
            pickup_time: parse_time(tokens[3], "pickup_time")?,
            payment_type: tokens[4].trim().to_string(),
            fare_amount: parse_field(tokens[5], "fare_amount")?,
            surcharge: parse_field(tokens[6], "surcharge")?,
            mta_tax: parse_field(tokens[7], "mta_tax")?,
            tip_amount: parse_field(tokens[8], "tip_amount")?,
            tolls_amount: parse_field(tokens[9], "tolls_amount")?,
            total_amount: parse_field(tokens[10], "total_amount")?,
        })
    }

    fn partition_key(&self) -> String {
        format!("{}_{}_{}", self.medallion, self.hack_license, self.vendor_id)
    }
}
