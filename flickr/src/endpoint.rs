use crate::error::Result;
use reqwest::Url;
use std::collections::BTreeMap;
use strum_macros::IntoStaticStr;

const DEFAULT_HOST: &str = "https://api.flickr.com";
const REST_PATH: &str = "services/rest/";

#[derive(Copy, Clone, Debug, PartialEq, Eq, IntoStaticStr)]
pub enum ApiMethod {
    #[strum(serialize = "flickr.interestingness.getList")]
    InterestingList,
    #[strum(serialize = "flickr.people.findByUsername")]
    FindByUsername,
    #[strum(serialize = "flickr.people.getPhotos")]
    UserPhotos,
    #[strum(serialize = "flickr.photos.getInfo")]
    PhotoInfo,
}

/// Parses `base` and appends `params` as the query string, sorted by name.
///
/// Equal parameter sets always yield the same URL, whatever order they
/// were supplied in. A later duplicate name replaces an earlier one.
pub fn build_url<'a, I>(base: &str, params: I) -> Result<Url>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut url = Url::parse(base)?;
    let params: BTreeMap<&str, &str> = params.into_iter().collect();
    if params.is_empty() {
        url.set_query(None);
    } else {
        let mut query = url.query_pairs_mut();
        query.clear();
        for (k, v) in params {
            query.append_pair(k, v);
        }
    }
    Ok(url)
}

#[derive(Debug, Clone)]
pub struct ApiEndpoint {
    rest: String,
    api_key: String,
}

impl ApiEndpoint {
    pub fn with_host(api_key: impl Into<String>, host: Option<&str>) -> Result<Self> {
        let host = host.unwrap_or(DEFAULT_HOST).trim_end_matches('/');
        let rest = format!("{host}/{REST_PATH}");
        Url::parse(&rest)?;
        Ok(Self {
            rest,
            api_key: api_key.into(),
        })
    }

    pub fn url(&self, method: ApiMethod, params: &[(&str, &str)]) -> Result<Url> {
        let method: &str = method.into();
        let common = [
            ("method", method),
            ("api_key", self.api_key.as_str()),
            ("format", "json"),
            ("nojsoncallback", "1"),
        ];
        build_url(&self.rest, common.into_iter().chain(params.iter().copied()))
    }
}
