use std::{fmt, str::FromStr};

use postdeck_core::posts::dto::PostStatus;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Es,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::En, Language::Es];

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Es => "es",
        }
    }

    /// Best guess from Telegram's `language_code` (`es`, `es-MX`, ...).
    pub fn from_code(code: Option<&str>) -> Self {
        code.and_then(|c| c.split(['-', '_']).next())
            .and_then(|c| c.to_ascii_lowercase().parse().ok())
            .unwrap_or_default()
    }

    pub fn strings(&self) -> &'static Strings {
        match self {
            Language::En => &EN,
            Language::Es => &ES,
        }
    }

    pub fn status_label(&self, status: PostStatus) -> &'static str {
        let s = self.strings();
        match status {
            PostStatus::Draft => s.status_draft,
            PostStatus::Scheduled => s.status_scheduled,
            PostStatus::Published => s.status_published,
            PostStatus::Failed => s.status_failed,
            PostStatus::Cancelled => s.status_cancelled,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "en" => Ok(Language::En),
            "es" => Ok(Language::Es),
            other => Err(anyhow::anyhow!("Unsupported language: {}", other)),
        }
    }
}

pub struct Strings {
    pub language_name: &'static str,
    pub main_menu: &'static str,
    pub post_menu: &'static str,
    pub schedule_menu: &'static str,
    pub settings_menu: &'static str,
    pub status_menu: &'static str,
    pub help: &'static str,
    pub btn_new_post: &'static str,
    pub btn_my_posts: &'static str,
    pub btn_schedule: &'static str,
    pub btn_scheduled_posts: &'static str,
    pub btn_status: &'static str,
    pub btn_accounts: &'static str,
    pub btn_channels: &'static str,
    pub btn_settings: &'static str,
    pub btn_language: &'static str,
    pub btn_help: &'static str,
    pub btn_stats: &'static str,
    pub btn_back: &'static str,
    pub btn_done: &'static str,
    pub btn_confirm: &'static str,
    pub btn_publish_now: &'static str,
    pub btn_cancel: &'static str,
    pub btn_cancel_post: &'static str,
    pub btn_remove: &'static str,
    pub btn_all: &'static str,
    pub btn_time_now: &'static str,
    pub btn_time_1h: &'static str,
    pub btn_time_3h: &'static str,
    pub btn_time_tomorrow: &'static str,
    pub ask_post_text: &'static str,
    pub no_active_draft: &'static str,
    pub draft_expired: &'static str,
    pub draft_text_missing: &'static str,
    pub choose_platforms: &'static str,
    pub select_platform_first: &'static str,
    pub choose_twitter_account: &'static str,
    pub twitter_account_selected: &'static str,
    pub choose_time: &'static str,
    pub confirm_post: &'static str,
    pub post_scheduled: &'static str,
    pub post_published_now: &'static str,
    pub post_cancelled: &'static str,
    pub no_posts: &'static str,
    pub posts_title: &'static str,
    pub accounts_title: &'static str,
    pub no_accounts_configured: &'static str,
    pub account_removed: &'static str,
    pub account_not_found: &'static str,
    pub admin_only: &'static str,
    pub channels_title: &'static str,
    pub no_channels: &'static str,
    pub language_updated: &'static str,
    pub oauth_available: &'static str,
    pub oauth_unavailable: &'static str,
    pub connect_from_dashboard: &'static str,
    pub stats_title: &'static str,
    pub stats_total: &'static str,
    pub stats_upcoming: &'static str,
    pub generic_error: &'static str,
    pub status_draft: &'static str,
    pub status_scheduled: &'static str,
    pub status_published: &'static str,
    pub status_failed: &'static str,
    pub status_cancelled: &'static str,
}

static EN: Strings = Strings {
    language_name: "🇬🇧 English",
    main_menu: "📬 <b>PostDeck</b>\n\nCompose, schedule and track your posts.",
    post_menu: "📝 <b>Posts</b>",
    schedule_menu: "🗓️ <b>Schedule</b>",
    settings_menu: "⚙️ <b>Settings</b>",
    status_menu: "📊 <b>Post status</b>\n\nPick a status to filter by.",
    help: "ℹ️ <b>Help</b>\n\n1. Tap <b>New post</b> and send the text.\n2. Pick the platforms.\n3. Pick a time and confirm.\n\nUse /menu at any time to get back here.",
    btn_new_post: "📝 New post",
    btn_my_posts: "📋 My posts",
    btn_schedule: "🗓️ Schedule",
    btn_scheduled_posts: "⏰ Scheduled posts",
    btn_status: "📊 Status",
    btn_accounts: "👤 Accounts",
    btn_channels: "📣 Channels",
    btn_settings: "⚙️ Settings",
    btn_language: "🌐 Language",
    btn_help: "ℹ️ Help",
    btn_stats: "📈 Quick stats",
    btn_back: "⬅️ Back",
    btn_done: "✅ Done",
    btn_confirm: "✅ Confirm",
    btn_publish_now: "🚀 Publish now",
    btn_cancel: "✖️ Cancel",
    btn_cancel_post: "🗑️ Cancel",
    btn_remove: "🗑️ Remove",
    btn_all: "All",
    btn_time_now: "Now",
    btn_time_1h: "In 1 hour",
    btn_time_3h: "In 3 hours",
    btn_time_tomorrow: "Tomorrow 09:00 UTC",
    ask_post_text: "✍️ Send me the text of your post.",
    no_active_draft: "Tap <b>New post</b> first, then send the text.",
    draft_expired: "This draft is no longer available. Start a new post.",
    draft_text_missing: "Send the post text first.",
    choose_platforms: "📡 Choose the platforms for this post, then tap Done.",
    select_platform_first: "Select at least one platform.",
    choose_twitter_account: "🐦 Which Twitter account should publish this post?",
    twitter_account_selected: "Twitter account selected",
    choose_time: "⏰ When should it be published?",
    confirm_post: "🔎 <b>Review your post</b>",
    post_scheduled: "✅ Post scheduled",
    post_published_now: "🚀 Post queued for publishing now",
    post_cancelled: "Post cancelled",
    no_posts: "No posts here yet.",
    posts_title: "📋 <b>Posts</b>",
    accounts_title: "👤 <b>Twitter accounts</b>",
    no_accounts_configured: "⚠️ No accounts configured",
    account_removed: "Account removed",
    account_not_found: "Account not found",
    admin_only: "⛔ Only bot administrators can remove accounts",
    channels_title: "📣 <b>Telegram channels</b>",
    no_channels: "No channels registered. Add them from the dashboard.",
    language_updated: "Language updated",
    oauth_available: "OAuth2 connection available",
    oauth_unavailable: "Manual credentials only",
    connect_from_dashboard: "Connect accounts for this platform from the dashboard.",
    stats_title: "📈 <b>Last 30 days</b>",
    stats_total: "Total posts",
    stats_upcoming: "Upcoming",
    generic_error: "❌ Something went wrong, please try again.",
    status_draft: "📝 Draft",
    status_scheduled: "⏰ Scheduled",
    status_published: "✅ Published",
    status_failed: "❌ Failed",
    status_cancelled: "🚫 Cancelled",
};

static ES: Strings = Strings {
    language_name: "🇪🇸 Español",
    main_menu: "📬 <b>PostDeck</b>\n\nRedacta, programa y sigue tus publicaciones.",
    post_menu: "📝 <b>Publicaciones</b>",
    schedule_menu: "🗓️ <b>Programar</b>",
    settings_menu: "⚙️ <b>Ajustes</b>",
    status_menu: "📊 <b>Estado de publicaciones</b>\n\nElige un estado para filtrar.",
    help: "ℹ️ <b>Ayuda</b>\n\n1. Pulsa <b>Nueva publicación</b> y envía el texto.\n2. Elige las plataformas.\n3. Elige la hora y confirma.\n\nUsa /menu en cualquier momento para volver aquí.",
    btn_new_post: "📝 Nueva publicación",
    btn_my_posts: "📋 Mis publicaciones",
    btn_schedule: "🗓️ Programar",
    btn_scheduled_posts: "⏰ Programadas",
    btn_status: "📊 Estado",
    btn_accounts: "👤 Cuentas",
    btn_channels: "📣 Canales",
    btn_settings: "⚙️ Ajustes",
    btn_language: "🌐 Idioma",
    btn_help: "ℹ️ Ayuda",
    btn_stats: "📈 Estadísticas",
    btn_back: "⬅️ Volver",
    btn_done: "✅ Listo",
    btn_confirm: "✅ Confirmar",
    btn_publish_now: "🚀 Publicar ahora",
    btn_cancel: "✖️ Cancelar",
    btn_cancel_post: "🗑️ Cancelar",
    btn_remove: "🗑️ Eliminar",
    btn_all: "Todas",
    btn_time_now: "Ahora",
    btn_time_1h: "En 1 hora",
    btn_time_3h: "En 3 horas",
    btn_time_tomorrow: "Mañana 09:00 UTC",
    ask_post_text: "✍️ Envíame el texto de tu publicación.",
    no_active_draft: "Pulsa <b>Nueva publicación</b> primero y luego envía el texto.",
    draft_expired: "Este borrador ya no está disponible. Empieza una nueva publicación.",
    draft_text_missing: "Envía primero el texto de la publicación.",
    choose_platforms: "📡 Elige las plataformas y pulsa Listo.",
    select_platform_first: "Selecciona al menos una plataforma.",
    choose_twitter_account: "🐦 ¿Qué cuenta de Twitter debe publicar esto?",
    twitter_account_selected: "Cuenta de Twitter seleccionada",
    choose_time: "⏰ ¿Cuándo se debe publicar?",
    confirm_post: "🔎 <b>Revisa tu publicación</b>",
    post_scheduled: "✅ Publicación programada",
    post_published_now: "🚀 Publicación en cola para publicarse ahora",
    post_cancelled: "Publicación cancelada",
    no_posts: "Todavía no hay publicaciones.",
    posts_title: "📋 <b>Publicaciones</b>",
    accounts_title: "👤 <b>Cuentas de Twitter</b>",
    no_accounts_configured: "⚠️ No hay cuentas configuradas",
    account_removed: "Cuenta eliminada",
    account_not_found: "Cuenta no encontrada",
    admin_only: "⛔ Solo los administradores del bot pueden eliminar cuentas",
    channels_title: "📣 <b>Canales de Telegram</b>",
    no_channels: "No hay canales registrados. Añádelos desde el panel.",
    language_updated: "Idioma actualizado",
    oauth_available: "Conexión OAuth2 disponible",
    oauth_unavailable: "Solo credenciales manuales",
    connect_from_dashboard: "Conecta las cuentas de esta plataforma desde el panel.",
    stats_title: "📈 <b>Últimos 30 días</b>",
    stats_total: "Publicaciones",
    stats_upcoming: "Próximas",
    generic_error: "❌ Algo salió mal, inténtalo de nuevo.",
    status_draft: "📝 Borrador",
    status_scheduled: "⏰ Programada",
    status_published: "✅ Publicada",
    status_failed: "❌ Fallida",
    status_cancelled: "🚫 Cancelada",
};
