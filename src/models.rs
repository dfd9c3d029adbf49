use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

pub const NAME_MAX: usize = 100;
pub const COMMENTS_MAX: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayOfWeek {
    pub const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
        DayOfWeek::Saturday,
        DayOfWeek::Sunday,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DayOfWeek::Monday => "monday",
            DayOfWeek::Tuesday => "tuesday",
            DayOfWeek::Wednesday => "wednesday",
            DayOfWeek::Thursday => "thursday",
            DayOfWeek::Friday => "friday",
            DayOfWeek::Saturday => "saturday",
            DayOfWeek::Sunday => "sunday",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Routine {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub daily_average: u32,
    pub comments: Option<String>,
    pub sort_order: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyData {
    pub id: Uuid,
    pub routine_id: Uuid,
    pub week_start: NaiveDate,
    pub monday: u32,
    pub tuesday: u32,
    pub wednesday: u32,
    pub thursday: u32,
    pub friday: u32,
    pub saturday: u32,
    pub sunday: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WeeklyData {
    /// All-zero row used both as the server's placeholder response when no
    /// row exists yet and as the client's optimistic stand-in before the
    /// server assigns an identity.
    pub fn zeroed(routine_id: Uuid, week_start: NaiveDate) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::nil(),
            routine_id,
            week_start,
            monday: 0,
            tuesday: 0,
            wednesday: 0,
            thursday: 0,
            friday: 0,
            saturday: 0,
            sunday: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn day(&self, day: DayOfWeek) -> u32 {
        match day {
            DayOfWeek::Monday => self.monday,
            DayOfWeek::Tuesday => self.tuesday,
            DayOfWeek::Wednesday => self.wednesday,
            DayOfWeek::Thursday => self.thursday,
            DayOfWeek::Friday => self.friday,
            DayOfWeek::Saturday => self.saturday,
            DayOfWeek::Sunday => self.sunday,
        }
    }

    pub fn day_mut(&mut self, day: DayOfWeek) -> &mut u32 {
        match day {
            DayOfWeek::Monday => &mut self.monday,
            DayOfWeek::Tuesday => &mut self.tuesday,
            DayOfWeek::Wednesday => &mut self.wednesday,
            DayOfWeek::Thursday => &mut self.thursday,
            DayOfWeek::Friday => &mut self.friday,
            DayOfWeek::Saturday => &mut self.saturday,
            DayOfWeek::Sunday => &mut self.sunday,
        }
    }

    pub fn total(&self) -> u32 {
        self.monday
            + self.tuesday
            + self.wednesday
            + self.thursday
            + self.friday
            + self.saturday
            + self.sunday
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSettings {
    pub id: Uuid,
    pub user_id: Uuid,
    pub available_days: u32,
    pub work_days: u32,
    pub work_hours_day: u32,
    pub timezone: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserSettings {
    pub fn validate(&self) -> Result<(), String> {
        if !(1..=7).contains(&self.available_days) {
            return Err("available_days must be between 1 and 7".to_string());
        }
        if !(1..=7).contains(&self.work_days) {
            return Err("work_days must be between 1 and 7".to_string());
        }
        if !(1..=24).contains(&self.work_hours_day) {
            return Err("work_hours_day must be between 1 and 24".to_string());
        }
        if self.timezone.trim().is_empty() {
            return Err("timezone is required".to_string());
        }
        if self.work_days > self.available_days {
            return Err("Work days cannot exceed available days".to_string());
        }
        Ok(())
    }
}

/// Routine merged with its current-week row, as served by the list and
/// create endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutineWithWeek {
    #[serde(flatten)]
    pub routine: Routine,
    pub weekly_data: Option<WeeklyData>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRoutine {
    pub name: String,
    pub daily_average: u32,
    #[serde(default)]
    pub comments: Option<String>,
}

impl CreateRoutine {
    pub fn validate(&mut self) -> Result<(), String> {
        self.name = self.name.trim().to_string();
        if self.name.is_empty() {
            return Err("name is required".to_string());
        }
        if self.name.len() > NAME_MAX {
            return Err("name must be 100 characters or less".to_string());
        }
        if self.daily_average == 0 {
            return Err("daily_average must be greater than 0".to_string());
        }
        if let Some(comments) = &self.comments {
            if comments.len() > COMMENTS_MAX {
                return Err("comments must be 1000 characters or less".to_string());
            }
        }
        Ok(())
    }
}

/// Serde folds an explicit `null` and an absent field into the same outer
/// `None`; routing present values (including `null`) through this keeps the
/// two cases apart.
fn present_field<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Partial routine update. `comments` is tri-state: absent leaves the value
/// alone, `null` clears it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateRoutine {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_average: Option<u32>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present_field"
    )]
    pub comments: Option<Option<String>>,
}

impl UpdateRoutine {
    pub fn validate(&mut self) -> Result<(), String> {
        if let Some(name) = &mut self.name {
            *name = name.trim().to_string();
            if name.is_empty() {
                return Err("name is required".to_string());
            }
            if name.len() > NAME_MAX {
                return Err("name must be 100 characters or less".to_string());
            }
        }
        if let Some(daily_average) = self.daily_average {
            if daily_average == 0 {
                return Err("daily_average must be greater than 0".to_string());
            }
        }
        if let Some(Some(comments)) = &self.comments {
            if comments.len() > COMMENTS_MAX {
                return Err("comments must be 1000 characters or less".to_string());
            }
        }
        Ok(())
    }

    pub fn apply_to(&self, routine: &mut Routine) {
        if let Some(name) = &self.name {
            routine.name = name.clone();
        }
        if let Some(daily_average) = self.daily_average {
            routine.daily_average = daily_average;
        }
        if let Some(comments) = &self.comments {
            routine.comments = comments.clone();
        }
        routine.updated_at = Utc::now();
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_days: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_days: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_hours_day: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

impl UpdateSettings {
    /// Merge this patch over the current row. Validation runs on the merged
    /// value so cross-field rules see the full picture.
    pub fn merged(&self, current: &UserSettings) -> UserSettings {
        UserSettings {
            id: current.id,
            user_id: current.user_id,
            available_days: self.available_days.unwrap_or(current.available_days),
            work_days: self.work_days.unwrap_or(current.work_days),
            work_hours_day: self.work_hours_day.unwrap_or(current.work_hours_day),
            timezone: self
                .timezone
                .clone()
                .unwrap_or_else(|| current.timezone.clone()),
            created_at: current.created_at,
            updated_at: Utc::now(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DayRequest {
    pub day: DayOfWeek,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetDayRequest {
    pub day: DayOfWeek,
    pub value: u32,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    pub token: Uuid,
    pub user_id: Uuid,
}

/// Success envelope: every API response wraps its payload as `{ "data": … }`.
#[derive(Debug, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> UserSettings {
        let now = Utc::now();
        UserSettings {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            available_days: 7,
            work_days: 5,
            work_hours_day: 8,
            timezone: "UTC".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn create_routine_trims_and_validates_name() {
        let mut req = CreateRoutine {
            name: "  Morning run  ".to_string(),
            daily_average: 2,
            comments: None,
        };
        req.validate().unwrap();
        assert_eq!(req.name, "Morning run");

        let mut empty = CreateRoutine {
            name: "   ".to_string(),
            daily_average: 2,
            comments: None,
        };
        assert!(empty.validate().is_err());
    }

    #[test]
    fn create_routine_rejects_zero_target() {
        let mut req = CreateRoutine {
            name: "Read".to_string(),
            daily_average: 0,
            comments: None,
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn settings_reject_work_days_over_available() {
        let patch = UpdateSettings {
            available_days: Some(5),
            work_days: Some(6),
            ..UpdateSettings::default()
        };
        let merged = patch.merged(&settings());
        let err = merged.validate().unwrap_err();
        assert_eq!(err, "Work days cannot exceed available days");
    }

    #[test]
    fn update_routine_null_comment_clears() {
        let patch: UpdateRoutine = serde_json::from_str(r#"{"comments": null}"#).unwrap();
        assert_eq!(patch.comments, Some(None));
        let untouched: UpdateRoutine = serde_json::from_str("{}").unwrap();
        assert_eq!(untouched.comments, None);
        let set: UpdateRoutine = serde_json::from_str(r#"{"comments": "note"}"#).unwrap();
        assert_eq!(set.comments, Some(Some("note".to_string())));

        let now = Utc::now();
        let mut routine = Routine {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: "Run".to_string(),
            daily_average: 2,
            comments: Some("old".to_string()),
            sort_order: 0,
            created_at: now,
            updated_at: now,
        };
        untouched.apply_to(&mut routine);
        assert_eq!(routine.comments, Some("old".to_string()));
        patch.apply_to(&mut routine);
        assert_eq!(routine.comments, None);
    }

    #[test]
    fn weekly_data_day_accessors_cover_all_days() {
        let mut week =
            WeeklyData::zeroed(Uuid::new_v4(), NaiveDate::from_ymd_opt(2026, 8, 24).unwrap());
        for (i, day) in DayOfWeek::ALL.into_iter().enumerate() {
            *week.day_mut(day) = i as u32 + 1;
            assert_eq!(week.day(day), i as u32 + 1);
        }
        assert_eq!(week.total(), 28);
    }
}
