//! Registration form record and its URL-query encoding.

use crate::result::PagecheckResult;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use url::Url;

/// Values of the home page's registration form.
///
/// Empty strings and empty sets mean "not filled". `gender` holds the radio
/// value (`male`, `female`, `other`); `subjects` the checkbox values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormRecord {
    /// `firstName`
    pub first_name: String,
    /// `lastName`
    pub last_name: String,
    /// Selected city text; empty for the placeholder option
    pub city: String,
    /// `email`
    pub email: String,
    /// `mobile`
    pub mobile: String,
    /// Checked radio value
    pub gender: Option<String>,
    /// Checked checkbox values
    pub subjects: BTreeSet<String>,
}

impl FormRecord {
    /// The record the submit scenario fills in
    #[must_use]
    pub fn sample() -> Self {
        Self {
            first_name: "Ido".to_string(),
            last_name: "Hatuell".to_string(),
            city: "Jerusalem".to_string(),
            email: "ido1456@gmail.com".to_string(),
            mobile: "123-45-678".to_string(),
            gender: Some("male".to_string()),
            subjects: ["math", "physics"].into_iter().map(str::to_string).collect(),
        }
    }

    /// Whether every field is empty or unselected
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self == &Self::default()
    }

    /// Encode as a form query string, field order matching the page
    #[must_use]
    pub fn to_query(&self) -> String {
        let mut query = url::form_urlencoded::Serializer::new(String::new());
        let _ = query
            .append_pair("firstName", &self.first_name)
            .append_pair("lastName", &self.last_name)
            .append_pair("city", &self.city)
            .append_pair("email", &self.email)
            .append_pair("mobile", &self.mobile);
        if let Some(gender) = &self.gender {
            let _ = query.append_pair("gender", gender);
        }
        for subject in &self.subjects {
            let _ = query.append_pair("subject", subject);
        }
        query.finish()
    }

    /// Decode from a form query string; unknown keys are ignored
    #[must_use]
    pub fn from_query(query: &str) -> Self {
        let mut record = Self::default();
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            let value = value.into_owned();
            match key.as_ref() {
                "firstName" => record.first_name = value,
                "lastName" => record.last_name = value,
                "city" => record.city = value,
                "email" => record.email = value,
                "mobile" => record.mobile = value,
                "gender" => record.gender = Some(value),
                "subject" => {
                    let _ = record.subjects.insert(value);
                }
                _ => {}
            }
        }
        record
    }

    /// Decode from the query of a submitted form's URL
    pub fn from_url(url: &str) -> PagecheckResult<Self> {
        let url = Url::parse(url)?;
        Ok(Self::from_query(url.query().unwrap_or_default()))
    }
}
