use crate::bug;
use flickr::{Client, PageNum, Photo, PhotoQuery, User};
use parking_lot::{Mutex, RwLock};

/// Identifies one fetch. A ticket from before the latest reset is stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    generation: u64,
    pub page: PageNum,
}

/// Paging bookkeeping for one photo grid.
#[derive(Debug)]
pub struct Pager {
    page: PageNum,
    fetching: bool,
    generation: u64,
    items: Vec<Photo>,
    last_batch: usize,
    exhausted: bool,
    page_size: u32,
}

impl Pager {
    pub fn new(page_size: u32) -> Self {
        Self {
            page: 1,
            fetching: false,
            generation: 0,
            items: Vec::new(),
            last_batch: 0,
            exhausted: false,
            page_size,
        }
    }

    pub fn page(&self) -> PageNum {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn items(&self) -> &[Photo] {
        &self.items
    }

    pub fn is_fetching(&self) -> bool {
        self.fetching
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Whether a loading indicator belongs after the last item.
    pub fn has_more(&self) -> bool {
        !self.exhausted && self.last_batch > 0
    }

    /// Whether reaching the bottom of the grid should fetch another page.
    pub fn wants_more(&self) -> bool {
        !self.items.is_empty() && !self.exhausted
    }

    /// Forgets any in-flight fetch; its completion will be discarded.
    pub fn abandon(&mut self) {
        self.generation += 1;
        self.fetching = false;
    }

    pub fn reset(&mut self) {
        self.abandon();
        self.items.clear();
        self.page = 1;
        self.last_batch = 0;
        self.exhausted = false;
    }

    /// Starts a fetch unless one is already in flight.
    pub fn begin(&mut self, reset: bool) -> Option<Ticket> {
        if self.fetching {
            return None;
        }
        if reset {
            self.reset();
        }
        self.fetching = true;
        Some(Ticket {
            generation: self.generation,
            page: self.page,
        })
    }

    fn is_current(&self, ticket: Ticket) -> bool {
        if ticket.generation != self.generation {
            debug!("dropping stale page {}", ticket.page);
            return false;
        }
        if !self.fetching {
            bug!("completion of page {} without a fetch in flight", ticket.page);
            return false;
        }
        true
    }

    /// Appends a fetched batch. Returns false if the ticket was stale.
    pub fn finish(&mut self, ticket: Ticket, batch: Vec<Photo>) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.fetching = false;
        self.last_batch = batch.len();
        if batch.len() < self.page_size as usize {
            self.exhausted = true;
        }
        self.items.extend(batch);
        self.page += 1;
        true
    }

    pub fn fail(&mut self, ticket: Ticket) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.fetching = false;
        self.last_batch = 0;
        true
    }
}

/// The query a grid pages through.
pub trait PhotoSource {
    const NAME: &'static str;

    /// `None` while there is nothing to page through yet.
    fn query(&self) -> Option<PhotoQuery>;
}

#[derive(Debug, Default)]
pub struct TopPhotos;

impl PhotoSource for TopPhotos {
    const NAME: &'static str = "top";

    fn query(&self) -> Option<PhotoQuery> {
        Some(PhotoQuery::Interesting)
    }
}

#[derive(Debug, Default)]
pub struct UserPhotos {
    user: RwLock<Option<User>>,
}

impl UserPhotos {
    pub fn set_user(&self, user: Option<User>) {
        *self.user.write() = user;
    }

    pub fn username(&self) -> Option<String> {
        self.user.read().as_ref().map(|u| u.username.clone())
    }
}

impl PhotoSource for UserPhotos {
    const NAME: &'static str = "user";

    fn query(&self) -> Option<PhotoQuery> {
        self.user
            .read()
            .as_ref()
            .map(|u| PhotoQuery::User(u.nsid.clone()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fetch {
    Appended(usize),
    /// A fetch was already in flight.
    Busy,
    /// Nothing to fetch.
    Idle,
    /// The grid was reset while the fetch was in flight.
    Stale,
}

#[derive(Debug)]
pub struct Feed<S> {
    pub source: S,
    pager: Mutex<Pager>,
}

impl<S: PhotoSource> Feed<S> {
    pub fn new(source: S, page_size: u32) -> Self {
        Self {
            source,
            pager: Mutex::new(Pager::new(page_size)),
        }
    }

    pub fn with<R>(&self, f: impl FnOnce(&Pager) -> R) -> R {
        f(&self.pager.lock())
    }

    pub fn reset(&self) {
        self.pager.lock().reset();
    }

    pub fn photo(&self, index: usize) -> Option<Photo> {
        self.pager.lock().items().get(index).cloned()
    }

    pub async fn get_more(&self, api: &Client, reset: bool) -> flickr::Result<Fetch> {
        let Some(query) = self.source.query() else {
            return Ok(Fetch::Idle);
        };
        let (ticket, per_page) = {
            let mut pager = self.pager.lock();
            match pager.begin(reset) {
                Some(t) => (t, pager.page_size()),
                None => return Ok(Fetch::Busy),
            }
        };
        match api.photos(&query, ticket.page, per_page).await {
            Ok(photos) => {
                let n = photos.len();
                if self.pager.lock().finish(ticket, photos) {
                    info!("{}: page {}: {} photos", S::NAME, ticket.page, n);
                    Ok(Fetch::Appended(n))
                } else {
                    Ok(Fetch::Stale)
                }
            }
            Err(e) => {
                if self.pager.lock().fail(ticket) {
                    Err(e)
                } else {
                    Ok(Fetch::Stale)
                }
            }
        }
    }

    /// Called when the grid has been scrolled to its bottom.
    pub async fn scrolled(&self, api: &Client) -> flickr::Result<Fetch> {
        if !self.pager.lock().wants_more() {
            return Ok(Fetch::Idle);
        }
        self.get_more(api, false).await
    }

    /// Called when the grid's screen is shown.
    pub async fn appear(&self, api: &Client) -> flickr::Result<Fetch> {
        let empty = {
            let mut pager = self.pager.lock();
            pager.abandon();
            pager.items().is_empty()
        };
        if empty {
            self.get_more(api, false).await
        } else {
            Ok(Fetch::Idle)
        }
    }
}
