use crate::config::{Config, read_config};
use crate::feed::{Feed, Fetch, Pager, PhotoSource, TopPhotos, UserPhotos};
use anyhow::Result;
use flickr::download::{DownloadClient, DownloadResponse};
use flickr::reqwest::{self, Proxy};
use flickr::{Client, PageNum, Photo, PhotoDetail, Size};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Screen {
    Top,
    User,
}

/// A message the front-end shows in a dismissable dialog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Alert {
    pub title: String,
    pub message: String,
}

impl Alert {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new("Error", message)
    }

    /// Cancelled requests are not worth telling anyone about.
    pub fn from_api(e: &flickr::Error) -> Option<Self> {
        if e.is_cancelled() {
            debug!("swallowing: {}", e);
            None
        } else {
            error!("api: {:?}", e);
            Some(Self::error(e.to_string()))
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GridItem {
    pub index: usize,
    pub title: String,
    pub thumbnail: String,
}

#[derive(Debug, Serialize)]
pub struct GridView {
    pub items: Vec<GridItem>,
    pub total: usize,
    pub page: PageNum,
    pub loading: bool,
    pub has_more: bool,
    pub exhausted: bool,
    pub alert: Option<Alert>,
}

#[derive(Debug, Serialize)]
pub struct Closeup {
    pub photo: Photo,
    pub image: Option<String>,
    pub detail: Option<PhotoDetail>,
    pub text: Option<String>,
    pub alert: Option<Alert>,
}

#[derive(Debug)]
pub struct Scroller {
    pub conf: Config,
    api: Client,
    images: DownloadClient,
    top: Feed<TopPhotos>,
    user: Feed<UserPhotos>,
}

fn grid_view<S: PhotoSource>(feed: &Feed<S>, offset: usize, alert: Option<Alert>) -> GridView {
    feed.with(|p: &Pager| {
        let items = p
            .items()
            .iter()
            .enumerate()
            .skip(offset)
            .map(|(index, photo)| GridItem {
                index,
                title: photo.title.clone(),
                thumbnail: photo
                    .thumbnail_url()
                    .map(String::from)
                    .unwrap_or_default(),
            })
            .collect();
        GridView {
            items,
            total: p.items().len(),
            page: p.page(),
            loading: p.is_fetching(),
            has_more: p.has_more(),
            exhausted: p.is_exhausted(),
            alert,
        }
    })
}

fn alert_of(r: flickr::Result<Fetch>) -> Option<Alert> {
    match r {
        Ok(_) => None,
        Err(e) => Alert::from_api(&e),
    }
}

impl Scroller {
    pub fn new() -> Result<Self> {
        let config = read_config()?;
        info!("config: {:?}", config);
        Self::with_config(config)
    }

    pub fn with_config(conf: Config) -> Result<Self> {
        let mut http = reqwest::Client::builder();
        if let Some(proxy) = &conf.proxy {
            http = http.proxy(Proxy::all(proxy)?);
        }
        let api = Client::with_http(http.build()?, &conf.api_key, conf.api_host.as_deref())?;
        let images = DownloadClient::new(conf.proxy.as_deref())?;
        Ok(Self {
            api,
            images,
            top: Feed::new(TopPhotos, conf.page_size),
            user: Feed::new(UserPhotos::default(), conf.page_size),
            conf,
        })
    }

    /// An empty batch for a saved user is reported, whichever action fetched it.
    fn user_alert(&self, r: flickr::Result<Fetch>) -> Option<Alert> {
        match r {
            Ok(Fetch::Appended(0)) => self
                .user
                .source
                .username()
                .map(|name| Alert::new("No Photos", format!("for {name}"))),
            r => alert_of(r),
        }
    }

    pub fn view(&self, screen: Screen, offset: usize) -> GridView {
        match screen {
            Screen::Top => grid_view(&self.top, offset, None),
            Screen::User => grid_view(&self.user, offset, None),
        }
    }

    /// The screen was navigated to. Requests still running for any other
    /// screen are cancelled first.
    pub async fn appear(&self, screen: Screen) -> GridView {
        self.api.cancel_all();
        match screen {
            Screen::Top => {
                let alert = alert_of(self.top.appear(&self.api).await);
                grid_view(&self.top, 0, alert)
            }
            Screen::User => {
                let alert = self.user_alert(self.user.appear(&self.api).await);
                grid_view(&self.user, 0, alert)
            }
        }
    }

    /// The grid was scrolled to its bottom; `offset` is how many items the
    /// caller already holds.
    pub async fn scroll(&self, screen: Screen, offset: usize) -> GridView {
        match screen {
            Screen::Top => {
                let alert = alert_of(self.top.scrolled(&self.api).await);
                grid_view(&self.top, offset, alert)
            }
            Screen::User => {
                let alert = self.user_alert(self.user.scrolled(&self.api).await);
                grid_view(&self.user, offset, alert)
            }
        }
    }

    pub async fn refresh(&self, screen: Screen) -> GridView {
        match screen {
            Screen::Top => {
                let alert = alert_of(self.top.get_more(&self.api, true).await);
                grid_view(&self.top, 0, alert)
            }
            Screen::User => {
                let alert = self.user_alert(self.user.get_more(&self.api, true).await);
                grid_view(&self.user, 0, alert)
            }
        }
    }

    pub async fn search(&self, username: &str) -> GridView {
        let username = username.trim();
        if username.is_empty() {
            let alert = Alert::error("Please enter a Flickr username to search for");
            return grid_view(&self.user, 0, Some(alert));
        }

        self.user.reset();
        self.api.cancel_all();
        let user = match self.api.find_by_username(username).await {
            Ok(user) => user,
            // Navigated away or searched again; the saved user stays.
            Err(e) if e.is_cancelled() => {
                debug!("search: lookup of {} cancelled", username);
                return grid_view(&self.user, 0, None);
            }
            Err(e) => {
                self.user.source.set_user(None);
                return grid_view(&self.user, 0, Alert::from_api(&e));
            }
        };
        info!("search: {} is {}", user.username, user.nsid);
        self.user.source.set_user(Some(user));

        let alert = self.user_alert(self.user.get_more(&self.api, true).await);
        grid_view(&self.user, 0, alert)
    }

    fn photo(&self, screen: Screen, index: usize) -> Option<Photo> {
        match screen {
            Screen::Top => self.top.photo(index),
            Screen::User => self.user.photo(index),
        }
    }

    pub async fn closeup(&self, screen: Screen, index: usize) -> Option<Closeup> {
        let photo = self.photo(screen, index)?;
        let mut alert = None;
        let image = match photo.large_url() {
            Ok(url) => Some(url.to_string()),
            Err(e) => {
                alert = Alert::from_api(&e);
                None
            }
        };
        let detail = match self.api.photo_info(&photo).await {
            Ok(d) => Some(d),
            Err(e) => {
                alert = alert.or_else(|| Alert::from_api(&e));
                None
            }
        };
        let text = detail.as_ref().map(ToString::to_string);
        Some(Closeup {
            photo,
            image,
            detail,
            text,
            alert,
        })
    }

    pub async fn image(
        &self,
        screen: Screen,
        index: usize,
        size: Size,
    ) -> Option<flickr::Result<DownloadResponse>> {
        let photo = self.photo(screen, index)?;
        Some(self.images.download_photo(&photo, size).await)
    }

    pub fn shutdown(&self) {
        self.api.cancel_all();
    }
}
