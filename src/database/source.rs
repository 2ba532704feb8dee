//! Source URL resolution
//!
//! Maps a connection URL from the job config onto a DuckDB attachment.
//! JDBC-style `jdbc:` prefixes are accepted and stripped.

use crate::error::{Error, Result};
use url::Url;

/// Databases DuckDB can attach as a read source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Postgres,
    Mysql,
    Sqlite,
    Duckdb,
}

impl SourceKind {
    /// DuckDB extension needed to attach this kind
    pub fn extension(self) -> Option<&'static str> {
        match self {
            SourceKind::Postgres => Some("postgres"),
            SourceKind::Mysql => Some("mysql"),
            SourceKind::Sqlite => Some("sqlite"),
            SourceKind::Duckdb => None,
        }
    }

    /// `TYPE` option of the ATTACH statement
    fn attach_type(self) -> Option<&'static str> {
        match self {
            SourceKind::Postgres => Some("POSTGRES"),
            SourceKind::Mysql => Some("MYSQL"),
            SourceKind::Sqlite => Some("SQLITE"),
            SourceKind::Duckdb => None,
        }
    }

    fn is_network(self) -> bool {
        matches!(self, SourceKind::Postgres | SourceKind::Mysql)
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceKind::Postgres => write!(f, "postgres"),
            SourceKind::Mysql => write!(f, "mysql"),
            SourceKind::Sqlite => write!(f, "sqlite"),
            SourceKind::Duckdb => write!(f, "duckdb"),
        }
    }
}

/// A resolved source: what kind of database and what to attach
#[derive(Clone, PartialEq, Eq)]
pub struct SourceLocator {
    kind: SourceKind,
    target: String,
}

impl std::fmt::Debug for SourceLocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceLocator")
            .field("kind", &self.kind)
            .field("target", &self.masked())
            .finish()
    }
}

impl SourceLocator {
    /// Resolve a connection URL plus credentials
    ///
    /// Supported forms:
    /// - `postgresql://host:5432/db` (or `postgres://`)
    /// - `mysql://host:3306/db` (or `mariadb://`)
    /// - `sqlite:///path/to/file.db`
    /// - `duckdb:///path/to/file.duckdb`, `file:///path`, or a bare path
    ///
    /// Credentials replace any user/password embedded in network URLs and
    /// are ignored for file databases.
    pub fn resolve(url: &str, user: &str, password: &str) -> Result<Self> {
        let raw = url.trim();
        let raw = raw.strip_prefix("jdbc:").unwrap_or(raw);

        let parsed = match Url::parse(raw) {
            Ok(parsed) => parsed,
            Err(url::ParseError::RelativeUrlWithoutBase) => return Ok(Self::from_path(raw)),
            Err(e) => return Err(Error::read(format!("Invalid source URL: {e}"))),
        };

        match parsed.scheme() {
            "postgres" | "postgresql" => Self::network(SourceKind::Postgres, parsed, user, password),
            "mysql" | "mariadb" => {
                let mut parsed = parsed;
                parsed
                    .set_scheme("mysql")
                    .map_err(|()| Error::read("Invalid MySQL source URL"))?;
                Self::network(SourceKind::Mysql, parsed, user, password)
            }
            "sqlite" => Ok(Self {
                kind: SourceKind::Sqlite,
                target: file_path(&parsed),
            }),
            "duckdb" | "file" => Ok(Self {
                kind: SourceKind::Duckdb,
                target: file_path(&parsed),
            }),
            other => Err(Error::read(format!(
                "Unsupported source URL scheme '{other}' (supported: postgresql, mysql, sqlite, duckdb)"
            ))),
        }
    }

    fn network(kind: SourceKind, mut url: Url, user: &str, password: &str) -> Result<Self> {
        url.set_username(user)
            .map_err(|()| Error::read(format!("Source URL cannot carry credentials: {url}")))?;
        url.set_password(Some(password))
            .map_err(|()| Error::read(format!("Source URL cannot carry credentials: {url}")))?;

        Ok(Self {
            kind,
            target: url.to_string(),
        })
    }

    fn from_path(path: &str) -> Self {
        let kind = if path.ends_with(".sqlite") || path.ends_with(".sqlite3") {
            SourceKind::Sqlite
        } else {
            SourceKind::Duckdb
        };
        Self {
            kind,
            target: path.to_string(),
        }
    }

    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    /// ATTACH statement binding this source read-only under `alias`
    pub fn attach_sql(&self, alias: &str) -> String {
        let target = quote_literal(&self.target);
        match self.kind.attach_type() {
            Some(ty) => format!("ATTACH {target} AS {alias} (TYPE {ty}, READ_ONLY);"),
            None => format!("ATTACH {target} AS {alias} (READ_ONLY);"),
        }
    }

    /// Target with the password masked, for logging
    pub fn masked(&self) -> String {
        if !self.kind.is_network() {
            return self.target.clone();
        }
        match Url::parse(&self.target) {
            Ok(mut url) if url.password().is_some() => {
                let _ = url.set_password(Some("****"));
                url.to_string()
            }
            _ => self.target.clone(),
        }
    }
}

/// Filesystem path of a `sqlite:`/`duckdb:`/`file:` URL
///
/// `duckdb://relative.db` puts the first segment in the host slot, so it
/// is glued back onto the path.
fn file_path(url: &Url) -> String {
    match url.host_str() {
        Some(host) if !host.is_empty() => format!("{host}{}", url.path()),
        _ => url.path().to_string(),
    }
}

/// Quote a SQL string literal
pub(crate) fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}
