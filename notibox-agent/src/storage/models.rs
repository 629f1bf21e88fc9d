use crate::storage::schema::notifications;
use chrono::NaiveDateTime;
use diesel::prelude::*;

/// One pending notification as persisted locally. `key` is assigned by the
/// database on insert and is never reused.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable)]
#[diesel(table_name = notifications)]
#[diesel(primary_key(key))]
pub struct Notification {
    pub key: i32,
    pub uri: String,
    pub remote_id: String,
    pub received_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = notifications)]
pub struct NewNotification<'a> {
    pub uri: &'a str,
    pub remote_id: &'a str,
    pub received_at: NaiveDateTime,
}
