use reqwest::Url;

use crate::model::{FilterState, Mirror};
use crate::transport::{parse_url, TransportError};

pub const SEARCH_LIMIT: u32 = 50;
const ORDER_BY: &str = "votes";

/// Parameters of one station search request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryParameters {
    pub tag: String,
    pub name: String,
    pub hidebroken: bool,
    pub limit: u32,
    pub order: &'static str,
    pub reverse: bool,
    pub countrycode: Option<String>,
    pub language: Option<&'static str>,
}

/// Language filter paired with a country code. `None` for all countries.
pub fn language_for_country(country: &str) -> Option<&'static str> {
    match country {
        "" => None,
        "JP" => Some("japanese"),
        _ => Some("english"),
    }
}

pub fn build_query(filter: &FilterState) -> QueryParameters {
    let countrycode = (!filter.country.is_empty()).then(|| filter.country.clone());
    QueryParameters {
        tag: filter.genre_tag.clone(),
        name: filter.search_term.clone(),
        hidebroken: true,
        limit: SEARCH_LIMIT,
        order: ORDER_BY,
        reverse: true,
        countrycode,
        language: language_for_country(&filter.country),
    }
}

impl QueryParameters {
    pub fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("tag", self.tag.clone()),
            ("name", self.name.clone()),
            ("hidebroken", self.hidebroken.to_string()),
            ("limit", self.limit.to_string()),
            ("order", self.order.to_string()),
            ("reverse", self.reverse.to_string()),
        ];
        if let Some(code) = &self.countrycode {
            pairs.push(("countrycode", code.clone()));
        }
        if let Some(language) = self.language {
            pairs.push(("language", language.to_string()));
        }
        pairs
    }

    pub fn search_url(&self, mirror: &Mirror, scheme: &str) -> Result<Url, TransportError> {
        let mut url = parse_url(&format!(
            "{}/json/stations/search",
            mirror.base_url(scheme)
        ))?;
        url.query_pairs_mut().extend_pairs(self.pairs());
        Ok(url)
    }
}

pub fn station_by_uuid_url(
    mirror: &Mirror,
    scheme: &str,
    uuid: &str,
) -> Result<Url, TransportError> {
    let mut url = parse_url(&format!("{}/json/stations/byuuid", mirror.base_url(scheme)))?;
    url.path_segments_mut()
        .map_err(|_| TransportError::InvalidUrl {
            url: mirror.base_url(scheme),
            reason: "mirror url cannot take a path".to_string(),
        })?
        .push(uuid);
    Ok(url)
}
