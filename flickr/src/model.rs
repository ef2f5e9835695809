use crate::error::{Error, Result};
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use strum_macros::IntoStaticStr;

pub type PageNum = u32;

pub type Response = Map<String, Value>;

fn check_stat(resp: &Response) -> Result<()> {
    match resp.get("stat") {
        None => Ok(()),
        Some(Value::String(s)) if s == "ok" => Ok(()),
        Some(_) => match resp.get("message").and_then(Value::as_str) {
            Some(message) => Err(Error::Flickr(message.to_owned())),
            None => Err(Error::Format("failed stat without message")),
        },
    }
}

pub fn from_response<T: DeserializeOwned>(resp: Response) -> Result<T> {
    check_stat(&resp)?;
    Ok(serde_json::from_value(Value::Object(resp))?)
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(rename = "_content")]
    content: String,
}

// Listings carry farm as an integer; strings and floats are rejected.
fn farm_from_integer<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<String, D::Error> {
    u64::deserialize(d).map(|n| n.to_string())
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Photo {
    #[serde(rename = "farm", deserialize_with = "farm_from_integer")]
    pub farm_id: String,
    #[serde(rename = "server")]
    pub server_id: String,
    #[serde(rename = "id")]
    pub photo_id: String,
    pub secret: String,
    pub title: String,
}

/// Size suffixes understood by the static image CDN.
#[derive(Copy, Clone, Debug, PartialEq, Eq, IntoStaticStr, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Size {
    #[strum(serialize = "s")]
    Square,
    #[strum(serialize = "m")]
    Small,
    #[strum(serialize = "t")]
    Thumbnail,
    #[strum(serialize = "z")]
    Medium,
    #[strum(serialize = "b")]
    Large,
}

impl Photo {
    pub fn url(&self, size: Size) -> Result<Url> {
        let size: &str = size.into();
        let url = format!(
            "https://farm{}.staticflickr.com/{}/{}_{}_{}.jpg",
            self.farm_id, self.server_id, self.photo_id, self.secret, size
        );
        Ok(Url::parse(&url)?)
    }

    pub fn thumbnail_url(&self) -> Result<Url> {
        self.url(Size::Thumbnail)
    }

    pub fn large_url(&self) -> Result<Url> {
        self.url(Size::Large)
    }
}

#[derive(Debug, Deserialize)]
struct PhotoPage {
    photo: Vec<Photo>,
}

#[derive(Debug, Deserialize)]
struct PhotoList {
    photos: PhotoPage,
}

/// Parses a photo listing, as returned by both the interestingness list and
/// a user's photo stream.
pub fn parse_photos(resp: Response) -> Result<Vec<Photo>> {
    let list: PhotoList = from_response(resp)?;
    Ok(list.photos.photo)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub username: String,
    pub nsid: String,
}

#[derive(Debug, Deserialize)]
struct UserNode {
    nsid: String,
    username: Content,
}

#[derive(Debug, Deserialize)]
struct UserLookup {
    user: UserNode,
}

pub fn parse_user(resp: Response) -> Result<User> {
    let r: UserLookup = from_response(resp)?;
    Ok(User {
        username: r.user.username.content,
        nsid: r.user.nsid,
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhotoDetail {
    pub title: String,
    pub description: String,
    pub author_real_name: String,
    pub location: String,
    pub date_taken: String,
}

impl fmt::Display for PhotoDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Title: {}", self.title)?;
        writeln!(f, "Description: {}", self.description)?;
        writeln!(f, "Author Name: {}", self.author_real_name)?;
        writeln!(f, "Location: {}", self.location)?;
        writeln!(f, "Date Taken: {}", self.date_taken)
    }
}

#[derive(Debug, Deserialize)]
struct Owner {
    realname: String,
    location: String,
}

#[derive(Debug, Deserialize)]
struct Dates {
    taken: String,
}

#[derive(Debug, Deserialize)]
struct InfoNode {
    owner: Owner,
    description: Content,
    dates: Dates,
}

#[derive(Debug, Deserialize)]
struct PhotoInfo {
    photo: InfoNode,
}

pub fn parse_photo_detail(photo: &Photo, resp: Response) -> Result<PhotoDetail> {
    let r: PhotoInfo = from_response(resp)?;
    let info = r.photo;
    Ok(PhotoDetail {
        title: photo.title.clone(),
        description: info.description.content,
        author_real_name: info.owner.realname,
        location: info.owner.location,
        date_taken: info.dates.taken,
    })
}

/// What a photo grid pages through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhotoQuery {
    Interesting,
    User(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(v: Value) -> Response {
        match v {
            Value::Object(m) => m,
            _ => panic!("not an object"),
        }
    }

    fn photo() -> Photo {
        Photo {
            farm_id: "5".into(),
            server_id: "4740".into(),
            photo_id: "38935250244".into(),
            secret: "092b54d6be".into(),
            title: "test".into(),
        }
    }

    #[test]
    fn large_url() {
        assert_eq!(
            photo().large_url().unwrap().as_str(),
            "https://farm5.staticflickr.com/4740/38935250244_092b54d6be_b.jpg"
        );
    }

    #[test]
    fn thumbnail_url() {
        assert_eq!(
            photo().thumbnail_url().unwrap().as_str(),
            "https://farm5.staticflickr.com/4740/38935250244_092b54d6be_t.jpg"
        );
    }

    #[test]
    fn thumbnail_and_large_differ_only_in_size_letter() {
        let p = photo();
        let t = p.thumbnail_url().unwrap().to_string();
        let b = p.large_url().unwrap().to_string();
        assert_ne!(t, b);
        assert_eq!(t.len(), b.len());
        let diff: Vec<(char, char)> = t
            .chars()
            .zip(b.chars())
            .filter(|(x, y)| x != y)
            .collect();
        assert_eq!(diff, vec![('t', 'b')]);
        assert!(t.ends_with("_t.jpg"));
    }

    #[test]
    fn parses_listing() {
        let r = response(json!({
            "photos": {
                "page": 1, "pages": 5, "perpage": 100, "total": 500,
                "photo": [
                    {"id": "38935250244", "owner": "130108065@N08", "secret": "092b54d6be",
                     "server": "4740", "farm": 5, "title": "misty.morning.rise.up",
                     "ispublic": 1, "isfriend": 0, "isfamily": 0},
                    {"id": "27869878289", "owner": "62440012@N04", "secret": "5e9929c4b1",
                     "server": "4752", "farm": 5, "title": "Incoming",
                     "ispublic": 1, "isfriend": 0, "isfamily": 0}
                ]
            },
            "stat": "ok"
        }));
        let photos = parse_photos(r).unwrap();
        assert_eq!(photos.len(), 2);
        assert_eq!(photos[0].farm_id, "5");
        assert_eq!(photos[0].photo_id, "38935250244");
        assert_eq!(photos[1].title, "Incoming");
    }

    #[test]
    fn listing_missing_field_is_a_format_error() {
        let r = response(json!({
            "photos": {
                "photo": [
                    {"id": "1", "secret": "a", "server": "2", "farm": 1, "title": "ok"},
                    {"id": "2", "secret": "b", "farm": 1, "title": "no server"}
                ]
            },
            "stat": "ok"
        }));
        let e = parse_photos(r).unwrap_err();
        assert!(e.is_format(), "{e:?}");
    }

    #[test]
    fn listing_without_photos_is_a_format_error() {
        let e = parse_photos(response(json!({"stat": "ok"}))).unwrap_err();
        assert!(e.is_format());
    }

    #[test]
    fn listing_with_null_title_is_a_format_error() {
        let r = response(json!({
            "photos": {"photo": [{"id": "1", "secret": "a", "server": "2", "farm": 1, "title": null}]}
        }));
        assert!(parse_photos(r).unwrap_err().is_format());
    }

    #[test]
    fn listing_with_non_integer_farm_is_a_format_error() {
        for farm in [json!("not-a-farm"), json!("5"), json!(1.5), json!(-1)] {
            let r = response(json!({
                "photos": {"photo": [{"id": "1", "secret": "a", "server": "2", "farm": farm, "title": "t"}]}
            }));
            assert!(parse_photos(r).unwrap_err().is_format(), "farm {farm}");
        }
    }

    #[test]
    fn parses_user() {
        let r = response(json!({
            "user": {
                "id": "155595619@N02",
                "nsid": "155595619@N02",
                "username": {"_content": "dovo329"}
            },
            "stat": "ok"
        }));
        assert_eq!(
            parse_user(r).unwrap(),
            User {
                username: "dovo329".into(),
                nsid: "155595619@N02".into()
            }
        );
    }

    #[test]
    fn failed_user_lookup_surfaces_message() {
        let r = response(json!({"stat": "fail", "code": 1, "message": "User not found"}));
        match parse_user(r) {
            Err(Error::Flickr(m)) => assert_eq!(m, "User not found"),
            r => panic!("unexpected {r:?}"),
        }
    }

    #[test]
    fn failed_stat_without_message_is_a_format_error() {
        let r = response(json!({"stat": "fail", "code": 1}));
        assert!(parse_user(r).unwrap_err().is_format());
    }

    #[test]
    fn user_missing_username_is_a_format_error() {
        let r = response(json!({"user": {"nsid": "1@N02"}, "stat": "ok"}));
        assert!(parse_user(r).unwrap_err().is_format());
    }

    #[test]
    fn parses_detail() {
        let r = response(json!({
            "photo": {
                "id": "38935250244",
                "owner": {
                    "nsid": "130108065@N08", "username": "hoffi99",
                    "realname": "Dirk Hoffmann", "location": "Bremen, Germany"
                },
                "title": {"_content": "misty.morning.rise.up"},
                "description": {"_content": "I was looking for this half a year ..."},
                "dates": {"posted": "1515738258", "taken": "2018-01-11 09:09:26"}
            },
            "stat": "ok"
        }));
        let d = parse_photo_detail(&photo(), r).unwrap();
        assert_eq!(d.title, "test");
        assert_eq!(d.author_real_name, "Dirk Hoffmann");
        assert_eq!(
            d.to_string(),
            "Title: test\n\
             Description: I was looking for this half a year ...\n\
             Author Name: Dirk Hoffmann\n\
             Location: Bremen, Germany\n\
             Date Taken: 2018-01-11 09:09:26\n"
        );
    }

    #[test]
    fn detail_missing_location_is_a_format_error() {
        let r = response(json!({
            "photo": {
                "owner": {"realname": "Dirk Hoffmann"},
                "description": {"_content": ""},
                "dates": {"taken": "2018-01-11 09:09:26"}
            },
            "stat": "ok"
        }));
        assert!(parse_photo_detail(&photo(), r).unwrap_err().is_format());
    }
}
