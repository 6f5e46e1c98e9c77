//! Plain-text listings of rooms and unallocated people.

use crate::engine::AllocationSystem;
use crate::model::room::{normalize_room_name, Category};
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::{Path, PathBuf};

const RULE: &str = "------------------------------------------";

/// File I/O failure while reading input or writing a listing.
#[derive(Debug)]
pub enum ReportError {
    Io { path: PathBuf, source: std::io::Error },
}

impl Display for ReportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "{}: {source}", path.display()),
        }
    }
}

impl Error for ReportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
        }
    }
}

/// Occupants of one room by display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomListing {
    Occupied {
        room: String,
        category: Category,
        names: Vec<String>,
    },
    Empty(String),
    RoomNotFound(String),
}

impl Display for RoomListing {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Occupied { room, names, .. } => {
                writeln!(f, "The members of room {room}:")?;
                writeln!(f, "{RULE}")?;
                for name in names {
                    writeln!(f, "{name}")?;
                }
                Ok(())
            }
            Self::Empty(room) => write!(f, "{room} is empty!"),
            Self::RoomNotFound(room) => write!(f, "There is no room {room} in the system!"),
        }
    }
}

pub fn room_occupants(system: &AllocationSystem, name: &str) -> RoomListing {
    let Some(room) = system.rooms().room(name) else {
        return RoomListing::RoomNotFound(normalize_room_name(name));
    };
    if room.is_empty() {
        return RoomListing::Empty(room.name.clone());
    }
    RoomListing::Occupied {
        room: room.name.clone(),
        category: room.category,
        names: room
            .occupants
            .iter()
            .map(|id| system.people().display_name(id))
            .collect(),
    }
}

/// Every occupied room in creation order with its occupants.
pub fn allocations_report(system: &AllocationSystem) -> String {
    let occupied: Vec<_> = system.rooms().iter().filter(|room| !room.is_empty()).collect();
    if occupied.is_empty() {
        return "There are no occupied rooms in the system!\n".to_string();
    }

    let mut output = String::from("ROOM ALLOCATIONS\n");
    for room in occupied {
        output.push('\n');
        output.push_str(&format!("{} ({})\n{RULE}\n", room.name, room.category));
        for id in &room.occupants {
            output.push_str(&system.people().display_name(id));
            output.push('\n');
        }
    }
    output
}

/// Every unallocated `(person, axis)` entry in the order it was recorded.
pub fn unallocated_report(system: &AllocationSystem) -> String {
    if system.unallocated().is_empty() {
        return "There are no unallocated people\n".to_string();
    }

    let mut output = format!("UNALLOCATED PEOPLE\n{RULE}\n");
    for entry in system.unallocated().iter() {
        output.push_str(&format!(
            "{} ({}) - {}\n",
            system.people().display_name(&entry.person_id),
            entry.person_id,
            entry.axis
        ));
    }
    output
}

/// Writes a listing to `path`, replacing any existing file.
pub fn write_report(path: impl AsRef<Path>, content: &str) -> Result<(), ReportError> {
    let path = path.as_ref();
    match fs::write(path, content) {
        Ok(()) => {
            info!(
                "event=report_write module=service status=ok bytes={}",
                content.len()
            );
            Ok(())
        }
        Err(source) => {
            error!(
                "event=report_write module=service status=error error={}",
                source
            );
            Err(ReportError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    }
}
