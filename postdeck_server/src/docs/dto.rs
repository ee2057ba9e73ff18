use crate::{
    analytics, auth, english_learning, info, media, oauth, platform_accounts, posts, telegram,
};
use postdeck_core::{
    accounts::dto::{NewPlatformAccount, Platform, PlatformAccountView},
    analytics::{AnalyticsReport, DailyCount},
    english_learning::dto::{AskRequest, Topic, TutorAnswer},
    helpers::dto::TokenPair,
    oauth_config::dto::OAuth2Platform,
    posts::dto::{MediaKind, MediaRef, NewPost, Post, PostContent, PostStatus, PostUpdate},
    telegram::dto::{
        BroadcastReport, BroadcastRequest, BroadcastSummary, ChannelResult, NewChannel,
        TelegramChannel,
    },
    users::dto::{Credentials, UserProfile},
};
use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        info::handler::info,
        auth::handler::register,
        auth::handler::login,
        auth::handler::refresh,
        auth::handler::profile,
        auth::handler::x_login,
        auth::handler::x_callback,
        oauth::handler::oauth_config,
        oauth::handler::twitter_authorize,
        oauth::handler::twitter_callback,
        platform_accounts::handler::list_accounts,
        platform_accounts::handler::create_account,
        platform_accounts::handler::delete_account,
        platform_accounts::handler::test_account,
        posts::handler::list_posts,
        posts::handler::create_post,
        posts::handler::update_post,
        analytics::handler::analytics,
        media::handler::upload_video,
        media::handler::upload_image,
        telegram::handler::list_channels,
        telegram::handler::add_channel,
        telegram::handler::broadcast_message,
        english_learning::handler::topics,
        english_learning::handler::ask,
    ),
    components(schemas(
        info::dto::Info,
        auth::dto::RefreshRequest,
        oauth::dto::AuthorizationUrl,
        platform_accounts::dto::CredentialTestResult,
        media::dto::UploadResponse,
        media::dto::FileUpload,
        Credentials,
        TokenPair,
        UserProfile,
        Platform,
        NewPlatformAccount,
        PlatformAccountView,
        OAuth2Platform,
        PostStatus,
        MediaKind,
        MediaRef,
        PostContent,
        Post,
        NewPost,
        PostUpdate,
        AnalyticsReport,
        DailyCount,
        TelegramChannel,
        NewChannel,
        BroadcastRequest,
        BroadcastReport,
        BroadcastSummary,
        ChannelResult,
        AskRequest,
        TutorAnswer,
        Topic,
    )),
    modifiers(&BearerAuth)
)]
pub struct ApiDoc;
