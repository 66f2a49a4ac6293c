//! Accident record schema
//!
//! Every harvested accident is normalized into the same 20 string columns, in the same order,
//! whether or not its detail page mentions them. [`AccidentField`] is the static table that
//! maps detail-page labels onto those columns.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One column of the accident schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccidentField {
    Date,
    Time,
    AircraftType,
    Operator,
    Registration,
    SerialNumber,
    ManufactureYear,
    EngineModel,
    Fatalities,
    OtherFatalities,
    Damage,
    Category,
    Location,
    Phase,
    Nature,
    DepartureAirport,
    DestinationAirport,
    InvestigatingAgency,
    ConfidenceRating,
    Url,
}

impl AccidentField {
    /// All columns in output order
    pub const ALL: [AccidentField; 20] = [
        Self::Date,
        Self::Time,
        Self::AircraftType,
        Self::Operator,
        Self::Registration,
        Self::SerialNumber,
        Self::ManufactureYear,
        Self::EngineModel,
        Self::Fatalities,
        Self::OtherFatalities,
        Self::Damage,
        Self::Category,
        Self::Location,
        Self::Phase,
        Self::Nature,
        Self::DepartureAirport,
        Self::DestinationAirport,
        Self::InvestigatingAgency,
        Self::ConfidenceRating,
        Self::Url,
    ];

    /// The label used both on detail pages and as the CSV column header
    pub fn label(&self) -> &'static str {
        match self {
            Self::Date => "Date",
            Self::Time => "Time",
            Self::AircraftType => "Type",
            Self::Operator => "Owner/operator",
            Self::Registration => "Registration",
            Self::SerialNumber => "MSN",
            Self::ManufactureYear => "Year of manufacture",
            Self::EngineModel => "Engine model",
            Self::Fatalities => "Fatalities",
            Self::OtherFatalities => "Other fatalities",
            Self::Damage => "Aircraft damage",
            Self::Category => "Category",
            Self::Location => "Location",
            Self::Phase => "Phase",
            Self::Nature => "Nature",
            Self::DepartureAirport => "Departure airport",
            Self::DestinationAirport => "Destination airport",
            Self::InvestigatingAgency => "Investigating agency",
            Self::ConfidenceRating => "Confidence Rating",
            Self::Url => "URL",
        }
    }

    /// Looks up the field a detail-page label fills
    ///
    /// Returns `None` for unknown labels and for `URL`, which always comes from the request
    /// and never from page content.
    pub fn from_page_label(label: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .filter(|field| *field != Self::Url)
            .find(|field| field.label() == label)
    }

    /// Column labels in output order
    pub fn header() -> [&'static str; 20] {
        Self::ALL.map(|field| field.label())
    }
}

impl fmt::Display for AccidentField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A single accident, one CSV row
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccidentRecord {
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Time")]
    pub time: String,
    #[serde(rename = "Type")]
    pub aircraft_type: String,
    #[serde(rename = "Owner/operator")]
    pub operator: String,
    #[serde(rename = "Registration")]
    pub registration: String,
    #[serde(rename = "MSN")]
    pub serial_number: String,
    #[serde(rename = "Year of manufacture")]
    pub manufacture_year: String,
    #[serde(rename = "Engine model")]
    pub engine_model: String,
    #[serde(rename = "Fatalities")]
    pub fatalities: String,
    #[serde(rename = "Other fatalities")]
    pub other_fatalities: String,
    #[serde(rename = "Aircraft damage")]
    pub damage: String,
    #[serde(rename = "Category")]
    pub category: String,
    #[serde(rename = "Location")]
    pub location: String,
    #[serde(rename = "Phase")]
    pub phase: String,
    #[serde(rename = "Nature")]
    pub nature: String,
    #[serde(rename = "Departure airport")]
    pub departure_airport: String,
    #[serde(rename = "Destination airport")]
    pub destination_airport: String,
    #[serde(rename = "Investigating agency")]
    pub investigating_agency: String,
    #[serde(rename = "Confidence Rating")]
    pub confidence_rating: String,
    #[serde(rename = "URL")]
    pub url: String,
}

impl AccidentRecord {
    /// Creates an empty record keyed by its source URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn get(&self, field: AccidentField) -> &str {
        match field {
            AccidentField::Date => &self.date,
            AccidentField::Time => &self.time,
            AccidentField::AircraftType => &self.aircraft_type,
            AccidentField::Operator => &self.operator,
            AccidentField::Registration => &self.registration,
            AccidentField::SerialNumber => &self.serial_number,
            AccidentField::ManufactureYear => &self.manufacture_year,
            AccidentField::EngineModel => &self.engine_model,
            AccidentField::Fatalities => &self.fatalities,
            AccidentField::OtherFatalities => &self.other_fatalities,
            AccidentField::Damage => &self.damage,
            AccidentField::Category => &self.category,
            AccidentField::Location => &self.location,
            AccidentField::Phase => &self.phase,
            AccidentField::Nature => &self.nature,
            AccidentField::DepartureAirport => &self.departure_airport,
            AccidentField::DestinationAirport => &self.destination_airport,
            AccidentField::InvestigatingAgency => &self.investigating_agency,
            AccidentField::ConfidenceRating => &self.confidence_rating,
            AccidentField::Url => &self.url,
        }
    }

    pub fn set(&mut self, field: AccidentField, value: impl Into<String>) {
        let slot = match field {
            AccidentField::Date => &mut self.date,
            AccidentField::Time => &mut self.time,
            AccidentField::AircraftType => &mut self.aircraft_type,
            AccidentField::Operator => &mut self.operator,
            AccidentField::Registration => &mut self.registration,
            AccidentField::SerialNumber => &mut self.serial_number,
            AccidentField::ManufactureYear => &mut self.manufacture_year,
            AccidentField::EngineModel => &mut self.engine_model,
            AccidentField::Fatalities => &mut self.fatalities,
            AccidentField::OtherFatalities => &mut self.other_fatalities,
            AccidentField::Damage => &mut self.damage,
            AccidentField::Category => &mut self.category,
            AccidentField::Location => &mut self.location,
            AccidentField::Phase => &mut self.phase,
            AccidentField::Nature => &mut self.nature,
            AccidentField::DepartureAirport => &mut self.departure_airport,
            AccidentField::DestinationAirport => &mut self.destination_airport,
            AccidentField::InvestigatingAgency => &mut self.investigating_agency,
            AccidentField::ConfidenceRating => &mut self.confidence_rating,
            AccidentField::Url => &mut self.url,
        };
        *slot = value.into();
    }
}
