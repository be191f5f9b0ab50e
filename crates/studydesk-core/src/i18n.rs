//! Timer panel message catalogue.
//!
//! User-facing text for the timer subsystem lives here and nowhere else.
//! English and Arabic are bundled; any other code falls back to English.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Ar,
}

impl Language {
    /// Resolve a language code such as `"ar"` or `"en-US"`.
    pub fn from_code(code: &str) -> Self {
        let primary = code.split(['-', '_']).next().unwrap_or_default();
        match primary.to_ascii_lowercase().as_str() {
            "ar" => Language::Ar,
            _ => Language::En,
        }
    }

    pub fn is_rtl(self) -> bool {
        matches!(self, Language::Ar)
    }
}

/// Strings shown by the timer panel. `{name}` is replaced by the timer name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Messages {
    pub language: Language,
    pub timer_created: &'static str,
    pub timer_name_required: &'static str,
    pub timer_duration_required: &'static str,
    pub timer_started: &'static str,
    pub timer_paused: &'static str,
    pub timer_deleted: &'static str,
    pub timer_not_found: &'static str,
    pub timer_already_completed: &'static str,
    pub timer_completed: &'static str,
    pub no_timers: &'static str,
}

const EN: Messages = Messages {
    language: Language::En,
    timer_created: "Timer created successfully",
    timer_name_required: "Please enter a timer name",
    timer_duration_required: "Please enter a duration greater than zero",
    timer_started: "Timer \"{name}\" started",
    timer_paused: "Timer \"{name}\" paused",
    timer_deleted: "Timer \"{name}\" deleted",
    timer_not_found: "No timer with that id",
    timer_already_completed: "Timer \"{name}\" has already finished",
    timer_completed: "Time's up: {name}",
    no_timers: "No timers yet",
};

const AR: Messages = Messages {
    language: Language::Ar,
    timer_created: "تم إنشاء المؤقت بنجاح",
    timer_name_required: "الرجاء إدخال اسم المؤقت",
    timer_duration_required: "الرجاء إدخال مدة أكبر من الصفر",
    timer_started: "بدأ المؤقت \"{name}\"",
    timer_paused: "تم إيقاف المؤقت \"{name}\" مؤقتًا",
    timer_deleted: "تم حذف المؤقت \"{name}\"",
    timer_not_found: "لا يوجد مؤقت بهذا المعرف",
    timer_already_completed: "المؤقت \"{name}\" انتهى بالفعل",
    timer_completed: "انتهى الوقت: {name}",
    no_timers: "لا توجد مؤقتات بعد",
};

impl Messages {
    pub fn for_language(code: &str) -> &'static Messages {
        match Language::from_code(code) {
            Language::En => &EN,
            Language::Ar => &AR,
        }
    }

    pub fn completed(&self, name: &str) -> String {
        self.timer_completed.replace("{name}", name)
    }

    pub fn started(&self, name: &str) -> String {
        self.timer_started.replace("{name}", name)
    }

    pub fn paused(&self, name: &str) -> String {
        self.timer_paused.replace("{name}", name)
    }

    pub fn deleted(&self, name: &str) -> String {
        self.timer_deleted.replace("{name}", name)
    }

    pub fn already_completed(&self, name: &str) -> String {
        self.timer_already_completed.replace("{name}", name)
    }

    pub fn validation(&self, err: &ValidationError) -> &'static str {
        match err {
            ValidationError::EmptyName => self.timer_name_required,
            ValidationError::NonPositiveDuration => self.timer_duration_required,
        }
    }
}
