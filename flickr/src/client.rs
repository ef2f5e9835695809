use crate::cancel::Tracker;
use crate::endpoint::{ApiEndpoint, ApiMethod};
use crate::error::{Error, Result};
use crate::model::{
    PageNum, Photo, PhotoDetail, PhotoQuery, Response, User, parse_photo_detail, parse_photos,
    parse_user,
};
use log::{debug, error};
use reqwest::{Client as Http, Url};
use std::sync::Arc;

async fn finalize(http: &Http, url: Url) -> Result<Response> {
    let r = http.get(url).send().await?;
    let st = r.status();
    if st.is_success() {
        debug!("{} from {}", st, r.url());
        let body = r.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    } else {
        error!("{} from {}", st, r.url());
        Err(Error::Status(st.as_u16(), r.text().await?))
    }
}

/// Flickr REST client. Clones share the same set of outstanding requests.
#[derive(Debug, Clone)]
pub struct Client {
    http: Http,
    api: ApiEndpoint,
    tracker: Arc<Tracker>,
}

impl Client {
    pub fn new(api_key: &str) -> Result<Self> {
        Self::with_http(Http::new(), api_key, None)
    }

    pub fn with_http(http: Http, api_key: &str, host: Option<&str>) -> Result<Self> {
        Ok(Self {
            http,
            api: ApiEndpoint::with_host(api_key, host)?,
            tracker: Arc::new(Tracker::new()),
        })
    }

    async fn call(&self, method: ApiMethod, params: &[(&str, &str)]) -> Result<Response> {
        let url = self.api.url(method, params)?;
        self.tracker.run(finalize(&self.http, url)).await
    }

    /// Cancels every request currently in flight on this client.
    pub fn cancel_all(&self) {
        self.tracker.cancel_all();
    }

    pub async fn interesting_photos(&self, page: PageNum, per_page: u32) -> Result<Vec<Photo>> {
        let (page, per_page) = (page.to_string(), per_page.to_string());
        let resp = self
            .call(
                ApiMethod::InterestingList,
                &[("page", page.as_str()), ("per_page", per_page.as_str())],
            )
            .await?;
        parse_photos(resp)
    }

    pub async fn find_by_username(&self, username: &str) -> Result<User> {
        let resp = self
            .call(ApiMethod::FindByUsername, &[("username", username)])
            .await?;
        parse_user(resp)
    }

    pub async fn user_photos(
        &self,
        nsid: &str,
        page: PageNum,
        per_page: u32,
    ) -> Result<Vec<Photo>> {
        let (page, per_page) = (page.to_string(), per_page.to_string());
        let resp = self
            .call(
                ApiMethod::UserPhotos,
                &[
                    ("user_id", nsid),
                    ("page", page.as_str()),
                    ("per_page", per_page.as_str()),
                ],
            )
            .await?;
        parse_photos(resp)
    }

    pub async fn photos(
        &self,
        query: &PhotoQuery,
        page: PageNum,
        per_page: u32,
    ) -> Result<Vec<Photo>> {
        match query {
            PhotoQuery::Interesting => self.interesting_photos(page, per_page).await,
            PhotoQuery::User(nsid) => self.user_photos(nsid, page, per_page).await,
        }
    }

    pub async fn photo_info(&self, photo: &Photo) -> Result<PhotoDetail> {
        let resp = self
            .call(
                ApiMethod::PhotoInfo,
                &[
                    ("photo_id", photo.photo_id.as_str()),
                    ("secret", photo.secret.as_str()),
                ],
            )
            .await?;
        parse_photo_detail(photo, resp)
    }
}
