mod job;
mod notification;
mod preference;

pub use job::{EmploymentType, Job, JobId, JobRecord, RemoteMode};
pub use notification::{
    AlertChannel, AlertLedgerEntry, NewAlertLedgerEntry, NewNotificationRecord,
    Notification,
};
pub use preference::{
    EmailFrequency, NotificationSettings, NotificationSettingsRecord, PreferenceModel,
    PreferenceRecord, UserId,
};
