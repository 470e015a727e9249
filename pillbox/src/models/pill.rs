use serde::{Deserialize, Serialize};

/// A catalog entry. Read-only reference data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PillRecord {
    pub id: i64,
    pub name: String,
    pub engname: Option<String>,
    pub companyname: Option<String>,
    pub companyengname: Option<String>,
    pub ingredientname: Option<String>,
    pub ingredientengname: Option<String>,
    pub pill_type: Option<String>,
    pub shape: Option<String>,
    pub efficacy: Option<String>,
    pub dosage: Option<String>,
    pub caution: Option<String>,
    pub cautionwarning: Option<String>,
    pub interaction: Option<String>,
    pub sideeffect: Option<String>,
    pub storagemethod: Option<String>,
    pub imagepath: Option<String>,
}

/// A pill together with how many users marked it as a favorite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PillSummary {
    pub pill: PillRecord,
    pub favorite_count: i64,
}

/// Which name column a prefix search runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameField {
    Name,
    Engname,
}

impl NameField {
    pub fn column(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Engname => "engname",
        }
    }
}

impl std::fmt::Display for NameField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.column())
    }
}

/// Columns a catalog listing may be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PillSortField {
    #[default]
    Id,
    Name,
    Engname,
    Companyname,
    Shape,
    Type,
    FavoriteCount,
}

impl PillSortField {
    /// SQL expression used in `ORDER BY`. Only ever one of these literals.
    pub fn sql(&self) -> &'static str {
        match self {
            Self::Id => "pills.id",
            Self::Name => "pills.name",
            Self::Engname => "pills.engname",
            Self::Companyname => "pills.companyname",
            Self::Shape => "pills.shape",
            Self::Type => "pills.type",
            Self::FavoriteCount => "favorite_count",
        }
    }
}

impl std::str::FromStr for PillSortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "id" => Ok(Self::Id),
            "name" => Ok(Self::Name),
            "engname" => Ok(Self::Engname),
            "companyname" => Ok(Self::Companyname),
            "shape" => Ok(Self::Shape),
            "type" => Ok(Self::Type),
            "favorite_count" | "favoritecount" => Ok(Self::FavoriteCount),
            _ => Err(format!("Unsupported sort field: {s}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

impl std::str::FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "ASC" => Ok(Self::Asc),
            "DESC" => Ok(Self::Desc),
            _ => Err(format!("Unsupported sort order: {s}")),
        }
    }
}
