//! Shareable join links.

use impostore_protocol::RoomCode;

const ROOM_PARAM: &str = "room";

/// Builds `{base_url}?room={code}`. If `base_url` already has a query
/// string the parameter is appended with `&`.
pub fn join_link(base_url: &str, code: &RoomCode) -> String {
    let separator = if base_url.contains('?') { '&' } else { '?' };
    format!("{base_url}{separator}{ROOM_PARAM}={code}")
}

/// Extracts the room code from a join link, if it carries a valid one.
/// The code is matched case-insensitively.
pub fn code_from_link(link: &str) -> Option<RoomCode> {
    let (_, query) = link.split_once('?')?;
    let query = query.split('#').next().unwrap_or_default();
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == ROOM_PARAM)
        .and_then(|(_, value)| RoomCode::parse(value).ok())
}
