// Hotel search API parameters
// Builds the validated query for hotel listing and room availability requests.
// Executing the request is left to the caller's HTTP client.

use crate::guest_distribution::{allocate, DistributionError, GuestRoomAllocation, OCCUPANCY_DELIMITER};
use crate::search_params::{parse_date, DateRange, SearchParams, DATE_FORMAT};
use chrono::NaiveDate;
use reqwest::RequestBuilder;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiParamsError {
    #[error("Missing {0} date")]
    MissingDate(&'static str),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid date range: checkout {checkout} is not after checkin {checkin}")]
    InvalidDateRange { checkin: String, checkout: String },

    #[error("Invalid occupancy: {0}")]
    InvalidOccupancy(String),

    #[error(transparent)]
    Distribution(#[from] DistributionError),
}

// Fixed request parameters the API expects on every call
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub lang: String,
    pub currency: String,
    pub country_code: String,
    pub partner_id: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            lang: "en_US".to_string(),
            currency: "SGD".to_string(),
            country_code: "SG".to_string(),
            partner_id: 1,
        }
    }
}

// Occupancy string for the `guests` parameter, matching `^\d+(\|\d+)*$`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Occupancy(String);

impl Occupancy {
    pub fn from_allocation(allocation: &GuestRoomAllocation) -> Self {
        Self(allocation.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    // Every segment fits a u32 once constructed
    pub fn rooms(&self) -> impl Iterator<Item = u32> + '_ {
        self.0
            .split(OCCUPANCY_DELIMITER)
            .filter_map(|part| part.parse().ok())
    }
}

impl FromStr for Occupancy {
    type Err = ApiParamsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let valid = s
            .split(OCCUPANCY_DELIMITER)
            .all(|part| part.bytes().all(|b| b.is_ascii_digit()) && part.parse::<u32>().is_ok());

        if valid {
            Ok(Self(s.to_string()))
        } else {
            Err(ApiParamsError::InvalidOccupancy(s.to_string()))
        }
    }
}

impl fmt::Display for Occupancy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// Query for the hotel price listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HotelSearchQuery {
    pub destination_id: String,
    pub checkin: String,
    pub checkout: String,
    pub lang: String,
    pub currency: String,
    pub country_code: String,
    pub guests: Occupancy,
    pub partner_id: u32,
    pub page: u32,
}

impl HotelSearchQuery {
    pub const ENDPOINT: &'static str = "hotels/prices";

    pub fn from_search(params: &SearchParams) -> Result<Self, ApiParamsError> {
        Self::from_search_with(params, &ApiConfig::default())
    }

    pub fn from_search_with(params: &SearchParams, config: &ApiConfig) -> Result<Self, ApiParamsError> {
        let (checkin, checkout) = stay_dates(&params.date)?;
        let guests = occupancy(params.guests, params.rooms)?;

        debug!(
            destination_id = %params.uid,
            %checkin,
            %checkout,
            %guests,
            page = params.page,
            "built hotel search query"
        );

        Ok(Self {
            destination_id: params.uid.clone(),
            checkin,
            checkout,
            lang: config.lang.clone(),
            currency: config.currency.clone(),
            country_code: config.country_code.clone(),
            guests,
            partner_id: config.partner_id,
            page: params.page,
        })
    }

    pub fn attach(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.query(self)
    }
}

// Query for one hotel's room prices; the hotel id goes in the path
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoomSearchQuery {
    #[serde(skip)]
    pub hotel_id: String,
    pub destination_id: String,
    pub checkin: String,
    pub checkout: String,
    pub lang: String,
    pub currency: String,
    pub country_code: String,
    pub guests: Occupancy,
    pub partner_id: u32,
}

impl RoomSearchQuery {
    pub fn from_search(params: &SearchParams, hotel_id: &str) -> Result<Self, ApiParamsError> {
        Self::from_search_with(params, hotel_id, &ApiConfig::default())
    }

    pub fn from_search_with(
        params: &SearchParams,
        hotel_id: &str,
        config: &ApiConfig,
    ) -> Result<Self, ApiParamsError> {
        let (checkin, checkout) = stay_dates(&params.date)?;
        let guests = occupancy(params.guests, params.rooms)?;

        debug!(hotel_id, %checkin, %checkout, %guests, "built room search query");

        Ok(Self {
            hotel_id: hotel_id.to_string(),
            destination_id: params.uid.clone(),
            checkin,
            checkout,
            lang: config.lang.clone(),
            currency: config.currency.clone(),
            country_code: config.country_code.clone(),
            guests,
            partner_id: config.partner_id,
        })
    }

    pub fn endpoint(&self) -> String {
        format!("hotels/{}/price", self.hotel_id)
    }

    pub fn attach(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.query(self)
    }
}

// Both dates set, ISO formatted, checkout strictly after checkin
pub fn stay_dates(date: &DateRange) -> Result<(String, String), ApiParamsError> {
    let checkin = required_date(date.checkin(), "checkin")?;
    let checkout = required_date(date.checkout(), "checkout")?;

    if checkout <= checkin {
        return Err(ApiParamsError::InvalidDateRange {
            checkin: checkin.format(DATE_FORMAT).to_string(),
            checkout: checkout.format(DATE_FORMAT).to_string(),
        });
    }

    Ok((
        checkin.format(DATE_FORMAT).to_string(),
        checkout.format(DATE_FORMAT).to_string(),
    ))
}

fn required_date(value: Option<&str>, which: &'static str) -> Result<NaiveDate, ApiParamsError> {
    let value = value.ok_or(ApiParamsError::MissingDate(which))?;
    parse_date(value).ok_or_else(|| ApiParamsError::InvalidDate(value.to_string()))
}

fn occupancy(guests: u32, rooms: u32) -> Result<Occupancy, ApiParamsError> {
    Ok(Occupancy::from_allocation(&allocate(guests, rooms)?))
}
