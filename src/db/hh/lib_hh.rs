use std::env;

use log::{error, info};
use reqwest::{blocking::Client, header::USER_AGENT, StatusCode};
use serde::{Deserialize, Deserializer};

use crate::error::ArchiveError;

pub const HH_API_URL: &str = "https://api.hh.ru";

/// Only the first page is requested.
pub const PER_PAGE: i64 = 10;

const DEFAULT_USER_AGENT: &str = "hh_archive/0.1 (vacancy archive)";

/// One page of the `/vacancies` endpoint.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct VacancyPage {
    pub items: Vec<VacancyRecord>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct VacancyRecord {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub alternate_url: Option<String>,
    pub employer: EmployerRecord,
    #[serde(default)]
    pub salary: Option<SalaryRecord>,
}

/// The employer object embedded in every vacancy.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
pub struct EmployerRecord {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub alternate_url: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct SalaryRecord {
    pub from: Option<i64>,
    pub to: Option<i64>,
    pub currency: Option<String>,
}

/// The API sends ids as strings, e.g. `"id": "1455"`.  Accept plain integers too.
fn deserialize_id<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Int(i64),
        Str(String),
    }

    match Id::deserialize(deserializer)? {
        Id::Int(n) => Ok(n),
        Id::Str(s) => s
            .parse::<i64>()
            .map_err(|_| serde::de::Error::custom(format!("invalid id: {:?}", s))),
    }
}

/// Where the vacancies come from.
pub trait VacancySource {
    /// Return `None` if the source has no data for this employer.
    fn fetch_for_employer(&self, employer_id: i64) -> Result<Option<VacancyPage>, ArchiveError>;
}

pub struct HhClient {
    base_url: String,
    user_agent: String,
    client: Client,
}

impl HhClient {
    /// The User-Agent can be overridden with the `HH_USER_AGENT` env variable.
    pub fn new() -> HhClient {
        HhClient {
            base_url: HH_API_URL.to_string(),
            user_agent: env::var("HH_USER_AGENT")
                .unwrap_or_else(|_| DEFAULT_USER_AGENT.to_string()),
            client: Client::new(),
        }
    }

    pub fn with_base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_user_agent<S: Into<String>>(mut self, user_agent: S) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

impl Default for HhClient {
    fn default() -> Self {
        Self::new()
    }
}

impl VacancySource for HhClient {
    /// One GET request, no retries.  A status other than 200 is logged and
    /// treated as no data.
    fn fetch_for_employer(&self, employer_id: i64) -> Result<Option<VacancyPage>, ArchiveError> {
        let url = format!("{}/vacancies", self.base_url);
        let response = self
            .client
            .get(url)
            .query(&[("employer_id", employer_id), ("per_page", PER_PAGE)])
            .header(USER_AGENT, self.user_agent.as_str())
            .send()?;
        let status = response.status();
        if status != StatusCode::OK {
            error!(
                "Failed to get vacancies for employer {}, status: {}",
                employer_id, status
            );
            return Ok(None);
        }
        let body = response.text()?;
        let page: VacancyPage = serde_json::from_str(&body)
            .map_err(|source| ArchiveError::Decode { employer_id, source })?;
        Ok(Some(page))
    }
}

/// Fetch the vacancies for each employer in turn, keeping the input order.
/// Employers without data contribute nothing.
pub fn fetch_for_all<S: VacancySource + ?Sized>(
    source: &S,
    employer_ids: &[i64],
) -> Result<Vec<VacancyRecord>, ArchiveError> {
    let mut vacancies = Vec::new();
    for &employer_id in employer_ids {
        if let Some(page) = source.fetch_for_employer(employer_id)? {
            info!(
                "Got {} vacancies for employer {}",
                page.items.len(),
                employer_id
            );
            vacancies.extend(page.items);
        }
    }
    Ok(vacancies)
}
