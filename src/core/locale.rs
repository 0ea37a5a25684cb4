//! User-facing strings.
//!
//! Every sentence the client shows (greeting, fallbacks, notifications) comes
//! from a [`Strings`] table so the whole UI switches language in one place.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub enum Locale {
    #[default]
    #[serde(rename = "en")]
    #[value(name = "en")]
    English,
    #[serde(rename = "id")]
    #[value(name = "id")]
    Indonesian,
}

pub struct Strings {
    pub app_title: &'static str,
    pub app_subtitle: &'static str,
    pub greeting: &'static str,
    pub new_chat_name: &'static str,
    pub session_name_prefix: &'static str,
    pub no_answer: &'static str,
    pub send_failed: &'static str,
    pub history_failed: &'static str,
    pub history_failed_notice: &'static str,
    pub sessions_failed: &'static str,
    pub session_not_found: &'static str,
    pub session_deleted: &'static str,
    pub delete_failed: &'static str,
    pub health_ok: &'static str,
    pub health_failed: &'static str,
    pub missing_session_id: &'static str,
    pub loading_sessions: &'static str,
    pub loading_messages: &'static str,
    pub empty_state: &'static str,
    pub no_sessions: &'static str,
    pub input_placeholder: &'static str,
    pub user_label: &'static str,
    pub waiting_reply: &'static str,
    pub sessions_title: &'static str,
    pub new_chat_entry: &'static str,
    pub confirm_delete: &'static str,
    pub help_input: &'static str,
    pub help_sidebar: &'static str,
}

const ENGLISH: Strings = Strings {
    app_title: "Drugbot",
    app_subtitle: "Medicine recommendation chatbot",
    greeting: "Hello! I'm your chatbot. How can I help you today?",
    new_chat_name: "New chat",
    session_name_prefix: "Session",
    no_answer: "Sorry, I couldn't process your request.",
    send_failed: "Sorry, something went wrong. Please try again later.",
    history_failed: "Failed to load the message history for this session.",
    history_failed_notice: "Failed to load messages for this session.",
    sessions_failed: "Failed to load chat history.",
    session_not_found: "That session no longer exists, starting a new chat.",
    session_deleted: "Session deleted.",
    delete_failed: "Failed to delete session.",
    health_ok: "Health check",
    health_failed: "Health check failed. Please try again later.",
    missing_session_id: "The backend did not return a session id; this chat is not saved yet.",
    loading_sessions: "Loading sessions...",
    loading_messages: "Loading messages...",
    empty_state: "Select a session or start a new chat.",
    no_sessions: "No chat history yet.",
    input_placeholder: "Type your message here...",
    user_label: "You",
    waiting_reply: "Thinking...",
    sessions_title: "Sessions",
    new_chat_entry: "+ New chat",
    confirm_delete: "Press d again to delete",
    help_input: "Enter send · Tab sessions · Ctrl+N new chat · Ctrl+R RAG · Ctrl+T health · Ctrl+C quit",
    help_sidebar: "↑/↓ move · Enter open · n new chat · d delete · Tab back",
};

const INDONESIAN: Strings = Strings {
    app_title: "Drugbot",
    app_subtitle: "Chatbot untuk Rekomendasi Obat",
    greeting: "Halo! Saya chatbot Anda. Apa yang bisa saya bantu hari ini?",
    new_chat_name: "Obrolan Baru",
    session_name_prefix: "Sesi",
    no_answer: "Maaf, saya tidak dapat memproses permintaan Anda.",
    send_failed: "Maaf, terjadi kesalahan. Silakan coba lagi nanti.",
    history_failed: "Gagal memuat riwayat pesan untuk sesi ini.",
    history_failed_notice: "Gagal memuat pesan untuk sesi ini.",
    sessions_failed: "Gagal memuat riwayat chat.",
    session_not_found: "Sesi tidak ditemukan, memulai obrolan baru.",
    session_deleted: "Sesi berhasil dihapus.",
    delete_failed: "Gagal menghapus sesi.",
    health_ok: "Health Check",
    health_failed: "Health Check gagal. Silakan coba lagi nanti.",
    missing_session_id: "Backend tidak mengembalikan id sesi; obrolan ini belum tersimpan.",
    loading_sessions: "Memuat sesi...",
    loading_messages: "Memuat pesan...",
    empty_state: "Pilih sesi atau buat obrolan baru.",
    no_sessions: "Belum ada riwayat chat.",
    input_placeholder: "Ketik pesan Anda di sini...",
    user_label: "Anda",
    waiting_reply: "Sedang berpikir...",
    sessions_title: "Riwayat Chat",
    new_chat_entry: "+ Obrolan Baru",
    confirm_delete: "Tekan d lagi untuk menghapus",
    help_input: "Enter kirim · Tab sesi · Ctrl+N obrolan baru · Ctrl+R RAG · Ctrl+T health · Ctrl+C keluar",
    help_sidebar: "↑/↓ pilih · Enter buka · n obrolan baru · d hapus · Tab kembali",
};

impl Locale {
    pub fn strings(self) -> &'static Strings {
        match self {
            Locale::English => &ENGLISH,
            Locale::Indonesian => &INDONESIAN,
        }
    }

    /// Parses the short codes used in config files and env vars.
    pub fn from_code(code: &str) -> Option<Locale> {
        match code.trim().to_ascii_lowercase().as_str() {
            "en" | "english" => Some(Locale::English),
            "id" | "indonesian" => Some(Locale::Indonesian),
            _ => None,
        }
    }
}
