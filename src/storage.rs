//! Attachment-id parsers injected into the machine storage watchers.
//!
//! Storage producers report attachments as `"<machine-id>:<storage-id>"`,
//! for example `0:0/1` for volume `0/1` attached to machine `0`.

use crate::names::Tag;
use crate::params::MachineStorageId;
use crate::NamesError;
use crate::Result;

/// Converts raw attachment ids into machine/storage tag pairs.
pub type AttachmentIdParser = fn(&[String]) -> Result<Vec<MachineStorageId>>;

pub fn parse_volume_attachment_ids(ids: &[String]) -> Result<Vec<MachineStorageId>> {
    parse_attachment_ids(ids, "volume", Tag::volume)
}

pub fn parse_filesystem_attachment_ids(ids: &[String]) -> Result<Vec<MachineStorageId>> {
    parse_attachment_ids(ids, "filesystem", Tag::filesystem)
}

fn parse_attachment_ids(
    ids: &[String],
    kind: &'static str,
    storage_tag: fn(&str) -> Result<Tag>,
) -> Result<Vec<MachineStorageId>> {
    ids.iter()
        .map(|id| -> Result<MachineStorageId> {
            let invalid = || NamesError::InvalidAttachmentId { kind, id: id.clone() };
            let (machine, storage) = id.split_once(':').ok_or_else(invalid)?;
            let machine_tag = Tag::machine(machine).map_err(|_| invalid())?;
            let attachment_tag = storage_tag(storage).map_err(|_| invalid())?;
            Ok(MachineStorageId {
                machine_tag: machine_tag.to_string(),
                attachment_tag: attachment_tag.to_string(),
            })
        })
        .collect()
}
