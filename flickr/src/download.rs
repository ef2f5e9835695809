use crate::Error;
use crate::error::Result;
use crate::model::{Photo, Size};
use log::error;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, Proxy, Response, header};
use std::time::Duration;

/// Fetches image bytes from the static CDN.
#[derive(Debug, Clone)]
pub struct DownloadClient {
    client: Client,
}

pub type DownloadResponse = Response;

impl DownloadClient {
    pub fn new(proxy: Option<&str>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            HeaderValue::from_static("image/avif,image/webp,image/apng,image/*,*/*;q=0.8"),
        );
        headers.insert(
            header::REFERER,
            HeaderValue::from_static("https://www.flickr.com/"),
        );
        let mut builder = Client::builder()
            .connect_timeout(Duration::from_secs(30))
            .timeout(Duration::from_secs(60))
            .default_headers(headers)
            .user_agent(concat!("flickr-scroller/", env!("CARGO_PKG_VERSION")));
        if let Some(proxy) = proxy {
            builder = builder.proxy(Proxy::all(proxy)?);
        }
        Ok(DownloadClient {
            client: builder.build()?,
        })
    }

    pub async fn download(&self, url: &str) -> Result<Response> {
        let r = self.client.get(url).send().await?;
        let st = r.status();
        if st.is_success() || st.is_redirection() {
            Ok(r)
        } else {
            error!("download: {st:?} from {url}");
            Err(Error::Status(st.as_u16(), r.text().await?))
        }
    }

    pub async fn download_photo(&self, photo: &Photo, size: Size) -> Result<Response> {
        self.download(photo.url(size)?.as_str()).await
    }
}
