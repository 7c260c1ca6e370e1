use serde::{Deserialize, Deserializer, Serialize};

use crate::{
    entities::{director, genre, movie},
    error::{AppError, AppResult},
};

/// Rows per page on `GET /movies/?page=N`.
pub const PAGE_SIZE: u64 = 10;

/// Longest text value a `String(255)` column holds.
pub const MAX_TEXT_LEN: usize = 255;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DirectorResponse {
    pub id: i32,
    pub name: Option<String>,
}

impl From<director::Model> for DirectorResponse {
    fn from(m: director::Model) -> Self {
        Self { id: m.id, name: m.name }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GenreResponse {
    pub id: i32,
    pub name: Option<String>,
}

impl From<genre::Model> for GenreResponse {
    fn from(m: genre::Model) -> Self {
        Self { id: m.id, name: m.name }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MovieResponse {
    pub id: i32,
    pub title: Option<String>,
    pub description: Option<String>,
    pub trailer: Option<String>,
    #[serde(serialize_with = "year::serialize")]
    pub year: Option<i32>,
    pub rating: Option<f64>,
    pub genre_id: Option<i32>,
    pub director_id: Option<i32>,
}

impl From<movie::Model> for MovieResponse {
    fn from(m: movie::Model) -> Self {
        Self {
            id: m.id,
            title: m.title,
            description: m.description,
            trailer: m.trailer,
            year: m.year,
            rating: m.rating,
            genre_id: m.genre_id,
            director_id: m.director_id,
        }
    }
}

/// Movie with its genre and director embedded.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MovieDetailResponse {
    #[serde(flatten)]
    pub movie: MovieResponse,
    pub genre: Option<GenreResponse>,
    pub director: Option<DirectorResponse>,
}

impl From<(movie::Model, Option<genre::Model>, Option<director::Model>)> for MovieDetailResponse {
    fn from((m, g, d): (movie::Model, Option<genre::Model>, Option<director::Model>)) -> Self {
        Self { movie: m.into(), genre: g.map(Into::into), director: d.map(Into::into) }
    }
}

/// Body of `POST` and `PUT` for directors and genres. Absent `name` is null.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct NamedInput {
    #[serde(default)]
    pub name: Option<String>,
}

impl NamedInput {
    pub fn validate(&self) -> AppResult<()> {
        check_len("name", self.name.as_deref())
    }
}

/// Body of `PATCH` for directors and genres.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct NamedPatch {
    #[serde(default, deserialize_with = "present")]
    pub name: Option<Option<String>>,
}

impl NamedPatch {
    pub fn validate(&self) -> AppResult<()> {
        check_len("name", self.name.as_ref().and_then(|n| n.as_deref()))
    }
}

/// Body of `POST` and `PUT` on movies. Every absent field is null.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct MovieInput {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub trailer: Option<String>,
    #[serde(default, deserialize_with = "year::deserialize")]
    pub year: Option<i32>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub genre_id: Option<i32>,
    #[serde(default)]
    pub director_id: Option<i32>,
}

impl MovieInput {
    pub fn validate(&self) -> AppResult<()> {
        check_len("title", self.title.as_deref())?;
        check_len("description", self.description.as_deref())?;
        check_len("trailer", self.trailer.as_deref())?;
        check_rating(self.rating)
    }
}

/// Body of `PATCH` on movies. The outer `Option` records whether the key was
/// sent at all; the inner one carries an explicit `null`.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct MoviePatch {
    #[serde(default, deserialize_with = "present")]
    pub title: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub trailer: Option<Option<String>>,
    #[serde(default, deserialize_with = "year::deserialize_present")]
    pub year: Option<Option<i32>>,
    #[serde(default, deserialize_with = "present")]
    pub rating: Option<Option<f64>>,
    #[serde(default, deserialize_with = "present")]
    pub genre_id: Option<Option<i32>>,
    #[serde(default, deserialize_with = "present")]
    pub director_id: Option<Option<i32>>,
}

impl MoviePatch {
    pub fn validate(&self) -> AppResult<()> {
        check_len("title", self.title.as_ref().and_then(|v| v.as_deref()))?;
        check_len("description", self.description.as_ref().and_then(|v| v.as_deref()))?;
        check_len("trailer", self.trailer.as_ref().and_then(|v| v.as_deref()))?;
        check_rating(self.rating.flatten())
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.trailer.is_none()
            && self.year.is_none()
            && self.rating.is_none()
            && self.genre_id.is_none()
            && self.director_id.is_none()
    }
}

/// Raw query string of `GET /movies/`.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct MovieListQuery {
    pub director_id: Option<String>,
    pub genre_id: Option<String>,
    pub page: Option<String>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Page {
    First,
    Second,
}

impl Page {
    pub fn parse(raw: &str) -> AppResult<Self> {
        match raw {
            "1" => Ok(Page::First),
            "2" => Ok(Page::Second),
            other => Err(AppError::InvalidFilter(format!("unsupported page: {other}"))),
        }
    }

    pub fn offset(self) -> u64 {
        match self {
            Page::First => 0,
            Page::Second => PAGE_SIZE,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct MovieFilter {
    pub director_id: Option<i32>,
    pub genre_id: Option<i32>,
    /// Takes precedence over the id filters when set.
    pub page: Option<Page>,
}

impl MovieFilter {
    pub fn by_genre(genre_id: i32) -> Self {
        Self { genre_id: Some(genre_id), ..Self::default() }
    }
}

impl TryFrom<MovieListQuery> for MovieFilter {
    type Error = AppError;

    fn try_from(q: MovieListQuery) -> AppResult<Self> {
        // `page` is matched verbatim and, when set, the id filters are not consulted.
        if let Some(raw) = q.page.as_deref().filter(|s| !s.is_empty()) {
            return Ok(Self { page: Some(Page::parse(raw)?), ..Self::default() });
        }
        Ok(Self {
            director_id: parse_id("director_id", q.director_id.as_deref())?,
            genre_id: parse_id("genre_id", q.genre_id.as_deref())?,
            page: None,
        })
    }
}

fn non_empty(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

fn parse_id(field: &str, raw: Option<&str>) -> AppResult<Option<i32>> {
    non_empty(raw)
        .map(|s| {
            s.parse::<i32>()
                .map_err(|_| AppError::Validation(format!("{field} must be an integer, got {s:?}")))
        })
        .transpose()
}

fn check_len(field: &str, value: Option<&str>) -> AppResult<()> {
    match value {
        Some(v) if v.chars().count() > MAX_TEXT_LEN => Err(AppError::Validation(format!(
            "{field} must be at most {MAX_TEXT_LEN} characters"
        ))),
        _ => Ok(()),
    }
}

fn check_rating(rating: Option<f64>) -> AppResult<()> {
    match rating {
        Some(r) if !r.is_finite() => {
            Err(AppError::Validation("rating must be a finite number".to_string()))
        },
        _ => Ok(()),
    }
}

/// Marks a key as present, keeping an explicit `null` as `Some(None)`.
fn present<'de, D, T>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

/// `year` is an integer column that travels as text.
mod year {
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(i64),
        Text(String),
    }

    pub fn serialize<S: Serializer>(year: &Option<i32>, ser: S) -> Result<S::Ok, S::Error> {
        match year {
            Some(y) => ser.serialize_str(&y.to_string()),
            None => ser.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<Option<i32>, D::Error> {
        let raw = Option::<Raw>::deserialize(de)
            .map_err(|_| D::Error::custom("year must be a string of digits or an integer"))?;
        match raw {
            None => Ok(None),
            Some(Raw::Number(n)) => {
                i32::try_from(n).map(Some).map_err(|_| D::Error::custom("year is out of range"))
            },
            Some(Raw::Text(s)) => {
                let s = s.trim();
                if s.is_empty() {
                    return Ok(None);
                }
                s.parse::<i32>()
                    .map(Some)
                    .map_err(|_| D::Error::custom(format!("year must be numeric, got {s:?}")))
            },
        }
    }

    pub fn deserialize_present<'de, D: Deserializer<'de>>(
        de: D,
    ) -> Result<Option<Option<i32>>, D::Error> {
        deserialize(de).map(Some)
    }
}
