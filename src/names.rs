//! Entity ids and their tag forms.
//!
//! Backend change producers speak in raw ids (`0/lxd/1`, `mysql/0`, `0/3`);
//! clients expect tags (`machine-0-lxd-1`, `unit-mysql-0`, `volume-0-3`).

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use lazy_static::lazy_static;
use regex::Regex;

use crate::NamesError;
use crate::Result;

/// Kinds of entities that may appear in a tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagKind {
    Machine,
    Unit,
    Application,
    User,
    Model,
    Controller,
    Volume,
    Filesystem,
}

impl TagKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            TagKind::Machine => "machine",
            TagKind::Unit => "unit",
            TagKind::Application => "application",
            TagKind::User => "user",
            TagKind::Model => "model",
            TagKind::Controller => "controller",
            TagKind::Volume => "volume",
            TagKind::Filesystem => "filesystem",
        }
    }

    fn from_prefix(prefix: &str) -> Option<Self> {
        let kind = match prefix {
            "machine" => TagKind::Machine,
            "unit" => TagKind::Unit,
            "application" => TagKind::Application,
            "user" => TagKind::User,
            "model" => TagKind::Model,
            "controller" => TagKind::Controller,
            "volume" => TagKind::Volume,
            "filesystem" => TagKind::Filesystem,
            _ => return None,
        };
        Some(kind)
    }
}

/// An entity tag: a kind plus the entity's raw id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tag {
    kind: TagKind,
    id: String,
}

impl Tag {
    pub fn machine(id: &str) -> Result<Self> {
        if !is_valid_machine_id(id) {
            return Err(NamesError::InvalidMachineId(id.to_string()).into());
        }
        Ok(Self::new_unchecked(TagKind::Machine, id))
    }

    pub fn unit(name: &str) -> Result<Self> {
        if !is_valid_unit_name(name) {
            return Err(NamesError::InvalidUnitName(name.to_string()).into());
        }
        Ok(Self::new_unchecked(TagKind::Unit, name))
    }

    pub fn application(name: &str) -> Result<Self> {
        if !is_valid_application_name(name) {
            return Err(NamesError::InvalidApplicationName(name.to_string()).into());
        }
        Ok(Self::new_unchecked(TagKind::Application, name))
    }

    pub fn user(name: &str) -> Result<Self> {
        if !is_valid_user_name(name) {
            return Err(NamesError::InvalidUserName(name.to_string()).into());
        }
        Ok(Self::new_unchecked(TagKind::User, name))
    }

    pub fn model(uuid: &str) -> Self {
        Self::new_unchecked(TagKind::Model, uuid)
    }

    pub fn controller(uuid: &str) -> Self {
        Self::new_unchecked(TagKind::Controller, uuid)
    }

    pub fn volume(id: &str) -> Result<Self> {
        if !is_valid_storage_id(id) {
            return Err(NamesError::InvalidVolumeId(id.to_string()).into());
        }
        Ok(Self::new_unchecked(TagKind::Volume, id))
    }

    pub fn filesystem(id: &str) -> Result<Self> {
        if !is_valid_storage_id(id) {
            return Err(NamesError::InvalidFilesystemId(id.to_string()).into());
        }
        Ok(Self::new_unchecked(TagKind::Filesystem, id))
    }

    /// Builds a validated tag of `kind` from a raw id.
    pub fn from_id(
        kind: TagKind,
        id: &str,
    ) -> Result<Self> {
        match kind {
            TagKind::Machine => Self::machine(id),
            TagKind::Unit => Self::unit(id),
            TagKind::Application => Self::application(id),
            TagKind::User => Self::user(id),
            TagKind::Model => Ok(Self::model(id)),
            TagKind::Controller => Ok(Self::controller(id)),
            TagKind::Volume => Self::volume(id),
            TagKind::Filesystem => Self::filesystem(id),
        }
    }

    fn new_unchecked(
        kind: TagKind,
        id: &str,
    ) -> Self {
        Self {
            kind,
            id: id.to_string(),
        }
    }

    pub fn kind(&self) -> TagKind {
        self.kind
    }

    /// The raw id, e.g. `mysql/0` for `unit-mysql-0`.
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for Tag {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let suffix = match self.kind {
            // Model and controller uuids contain dashes but never slashes.
            TagKind::Model | TagKind::Controller | TagKind::User => self.id.clone(),
            _ => self.id.replace('/', "-"),
        };
        write!(f, "{}-{}", self.kind.prefix(), suffix)
    }
}

impl FromStr for Tag {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_tag(s)
    }
}

/// Parses a tag string such as `unit-mysql-0` back into a [`Tag`].
pub fn parse_tag(s: &str) -> Result<Tag> {
    let invalid = || NamesError::InvalidTag(s.to_string());
    let (prefix, rest) = s.split_once('-').ok_or_else(invalid)?;
    let kind = TagKind::from_prefix(prefix).ok_or_else(invalid)?;
    if rest.is_empty() {
        return Err(invalid().into());
    }

    let id = match kind {
        TagKind::Machine | TagKind::Volume | TagKind::Filesystem => rest.replace('-', "/"),
        TagKind::Unit => {
            // The unit number follows the last dash; application names may contain dashes.
            let (app, number) = rest.rsplit_once('-').ok_or_else(invalid)?;
            format!("{}/{}", app, number)
        }
        TagKind::Application | TagKind::User | TagKind::Model | TagKind::Controller => rest.to_string(),
    };

    Tag::from_id(kind, &id).map_err(|_| invalid().into())
}

const NUMBER: &str = "(0|[1-9][0-9]*)";
const APPLICATION: &str = "[a-z][a-z0-9]*(-[a-z0-9]*[a-z][a-z0-9]*)*";
const USER_PART: &str = "[a-zA-Z0-9][a-zA-Z0-9.+-]*";

fn machine_pattern() -> String {
    format!("{NUMBER}(/[a-z]+/{NUMBER})*")
}

lazy_static! {
    /// A number, optionally followed by `/<container-type>/<number>` pairs
    static ref MACHINE_ID: Regex = Regex::new(&format!("^{}$", machine_pattern()))
        .expect("machine id pattern is valid");

    /// `<application>/<number>`
    static ref UNIT_NAME: Regex = Regex::new(&format!("^{APPLICATION}/{NUMBER}$"))
        .expect("unit name pattern is valid");

    /// Lowercase dash-separated words starting with a letter; no word is purely numeric
    static ref APPLICATION_NAME: Regex = Regex::new(&format!("^{APPLICATION}$"))
        .expect("application name pattern is valid");

    /// Local user names, optionally qualified with `@domain`
    static ref USER_NAME: Regex = Regex::new(&format!("^{USER_PART}(@{USER_PART})?$"))
        .expect("user name pattern is valid");

    /// `<number>`, or `<machine-id>/<number>` for machine-scoped storage
    static ref STORAGE_ID: Regex = Regex::new(&format!("^({}/)?{NUMBER}$", machine_pattern()))
        .expect("storage id pattern is valid");
}

pub fn is_valid_machine_id(id: &str) -> bool {
    MACHINE_ID.is_match(id)
}

pub fn is_valid_unit_name(name: &str) -> bool {
    UNIT_NAME.is_match(name)
}

pub fn is_valid_application_name(name: &str) -> bool {
    APPLICATION_NAME.is_match(name)
}

pub fn is_valid_user_name(name: &str) -> bool {
    USER_NAME.is_match(name)
}

/// Volume and filesystem ids share one grammar.
pub fn is_valid_storage_id(id: &str) -> bool {
    STORAGE_ID.is_match(id)
}

/// Mapping function injected into the entities watcher: raw ids in, tag strings out.
pub type MapChangesFn = Arc<dyn Fn(Vec<String>) -> Result<Vec<String>> + Send + Sync>;

/// Builds a mapper converting raw ids of one entity kind into tag strings.
///
/// The whole batch fails on the first id that is not valid for `kind`.
pub fn entity_mapper(kind: TagKind) -> MapChangesFn {
    Arc::new(move |ids: Vec<String>| -> Result<Vec<String>> {
        ids.iter()
            .map(|id| Tag::from_id(kind, id).map(|tag| tag.to_string()))
            .collect()
    })
}
