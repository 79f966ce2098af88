use actix_web::{web, HttpRequest, HttpResponse, Responder};
use std::sync::Arc;
use validator::Validate;

use crate::core::{Engine, EngineError, EnterOutcome, LeaveOutcome};
use crate::models::{
    AdminStatsResponse, ContentRequest, EnterRequest, ErrorResponse, EventAck, Gender, HandleQuery,
    HealthResponse, LeaveRequest, PartnerInfo, Preference, ReportRequest, SetProRequest,
    SkipRequest, StatsResponse, UpsertProfileRequest, UserId, UserStatus,
};
use crate::models::responses::EnterResponse;
use crate::services::{
    ProfileFields, ProfileStore, RelayDispatcher, ReportStore, SessionStore, Transport,
};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Engine>,
    pub profiles: Arc<ProfileStore>,
    pub reports: Arc<ReportStore>,
    pub store: SessionStore,
    pub relay: RelayDispatcher,
    pub transport: Arc<dyn Transport>,
    pub owner_id: Option<UserId>,
    pub admin_token: Option<String>,
}

/// Configure all event and profile routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/events/enter", web::post().to(enter))
        .route("/events/leave", web::post().to(leave))
        .route("/events/skip", web::post().to(skip))
        .route("/events/content", web::post().to(content))
        .route("/events/report", web::post().to(report))
        .route("/profile", web::post().to(upsert_profile))
        .route("/profile/by-handle", web::get().to(profile_by_handle))
        .route("/stats", web::get().to(stats))
        .route("/admin/stats", web::get().to(admin_stats))
        .route("/admin/pro", web::post().to(set_pro));
}

fn user_error(error: &str, message: &str) -> HttpResponse {
    HttpResponse::Conflict().json(ErrorResponse {
        error: error.to_string(),
        message: message.to_string(),
        status_code: 409,
    })
}

fn internal_error(message: String) -> HttpResponse {
    HttpResponse::InternalServerError().json(ErrorResponse {
        error: "internal".to_string(),
        message,
        status_code: 500,
    })
}

fn engine_error(e: EngineError) -> HttpResponse {
    match e {
        EngineError::AlreadyActive => user_error(
            "already_active",
            "You are already in a conversation or searching. Use leave to stop first.",
        ),
        EngineError::NotActive => user_error(
            "not_active",
            "You are not in a conversation or queue.",
        ),
        EngineError::Store(e) => internal_error(e.to_string()),
        EngineError::Profile(e) => internal_error(e.to_string()),
    }
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let db_healthy = state.store.health_check().await.unwrap_or(false);
    let status = if db_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Finish an enter that went through the engine: send the notifications the
/// outcome calls for (outside the engine's critical section) and build the
/// response. Notification failures are logged, never rolled back.
async fn complete_enter(state: &AppState, user: UserId, outcome: EnterOutcome) -> HttpResponse {
    if let EnterOutcome::Matched { a, b } = outcome {
        let summary_a = state.profiles.summary_of(a).await.unwrap_or_default();
        let summary_b = state.profiles.summary_of(b).await.unwrap_or_default();

        for (recipient, other_summary) in [(a, &summary_b), (b, &summary_a)] {
            let text = format!(
                "✅ Partner found!\n\nYour partner's profile:\n{}\n\nSend /stop to end, /next to search again.",
                other_summary.render()
            );
            if let Err(e) = state.transport.notify(recipient, &text).await {
                tracing::error!(user = %recipient, error = %e, "failed to send partner-found notice");
            }
        }

        // Usually the caller is one side of the pair. A restored queue can
        // match two longer-waiting users instead, leaving the caller queued.
        if let Some(partner) = outcome.partner_of(user) {
            let summary = if partner == a { summary_a } else { summary_b };
            return HttpResponse::Ok().json(EnterResponse {
                status: UserStatus::Chatting,
                partner: Some(PartnerInfo { summary }),
            });
        }
    }

    if let Err(e) = state
        .transport
        .notify(user, "🔎 Searching for a partner... Please wait.")
        .await
    {
        tracing::warn!(user = %user, error = %e, "failed to send searching notice");
    }
    HttpResponse::Ok().json(EnterResponse {
        status: UserStatus::Waiting,
        partner: None,
    })
}

/// Enter the waiting queue
///
/// POST /api/v1/events/enter
///
/// A gendered preference is a pro feature and requires a complete profile;
/// `any` is open to everyone.
async fn enter(state: web::Data<AppState>, req: web::Json<EnterRequest>) -> impl Responder {
    let user = UserId(req.user_id);

    if let Err(e) = state.profiles.touch(user, req.handle.as_deref()).await {
        return internal_error(e.to_string());
    }

    let preference: Preference = match req.preference.parse() {
        Ok(p) => p,
        Err(_) => {
            return HttpResponse::BadRequest().json(ErrorResponse {
                error: "invalid_preference".to_string(),
                message: "Preference must be one of: any, male, female, undisclosed".to_string(),
                status_code: 400,
            });
        }
    };

    if preference != Preference::Any {
        match state.profiles.get_profile(user).await {
            Ok(None) => {
                return HttpResponse::Forbidden().json(ErrorResponse {
                    error: "profile_required".to_string(),
                    message: "Complete your profile before searching by gender.".to_string(),
                    status_code: 403,
                });
            }
            Ok(Some(profile)) if !profile.is_pro => {
                return HttpResponse::Forbidden().json(ErrorResponse {
                    error: "pro_required".to_string(),
                    message: "Searching by gender is a Pro feature. Contact the operator to upgrade.".to_string(),
                    status_code: 403,
                });
            }
            Ok(Some(_)) => {}
            Err(e) => return internal_error(e.to_string()),
        }
    }

    tracing::info!(user = %user, preference = %preference, "enter event");

    match state.engine.enter(user, preference).await {
        Ok(outcome) => complete_enter(&state, user, outcome).await,
        Err(e) => engine_error(e),
    }
}

/// Leave the queue or end the current conversation
///
/// POST /api/v1/events/leave
async fn leave(state: web::Data<AppState>, req: web::Json<LeaveRequest>) -> impl Responder {
    let user = UserId(req.user_id);

    match state.engine.leave(user).await {
        Ok(LeaveOutcome::LeftQueue) => HttpResponse::Ok().json(EventAck {
            success: true,
            message: "Search cancelled.".to_string(),
        }),
        Ok(LeaveOutcome::EndedChat { partner }) => {
            if let Err(e) = state
                .transport
                .notify(partner, "❌ Your partner has ended the conversation.")
                .await
            {
                tracing::warn!(partner = %partner, error = %e, "failed to notify ex-partner");
            }
            HttpResponse::Ok().json(EventAck {
                success: true,
                message: "❌ Conversation ended.".to_string(),
            })
        }
        Err(e) => engine_error(e),
    }
}

/// Skip the current partner and immediately search again
///
/// POST /api/v1/events/skip
///
/// Teardown and re-enter are two separate engine steps on purpose; a crash
/// between them leaves the user idle. When the user is not chatting, skip
/// behaves like a plain enter.
async fn skip(state: web::Data<AppState>, req: web::Json<SkipRequest>) -> impl Responder {
    let user = UserId(req.user_id);

    match state.engine.end_chat(user).await {
        Ok(Some(partner)) => {
            if let Err(e) = state
                .transport
                .notify(partner, "🚶 Your partner has moved on to another chat.")
                .await
            {
                tracing::warn!(partner = %partner, error = %e, "failed to notify ex-partner");
            }
        }
        Ok(None) => {}
        Err(e) => return engine_error(e),
    }

    match state.engine.enter(user, Preference::Any).await {
        Ok(outcome) => complete_enter(&state, user, outcome).await,
        Err(e) => engine_error(e),
    }
}

/// Relay chat content to the sender's partner
///
/// POST /api/v1/events/content
async fn content(state: web::Data<AppState>, req: web::Json<ContentRequest>) -> impl Responder {
    let user = UserId(req.user_id);

    let partner = match state.engine.resolve_partner(user).await {
        Some(partner) => partner,
        None => {
            return user_error(
                "not_chatting",
                "You are not in a conversation. Use enter or skip to start searching.",
            );
        }
    };

    match state.relay.forward(user, partner, &req.payload).await {
        Ok(()) => HttpResponse::Ok().json(EventAck {
            success: true,
            message: "Delivered.".to_string(),
        }),
        Err(e) => {
            // The pairing stays up; only the acting user hears about this.
            tracing::warn!(sender = %user, partner = %partner, error = %e, "relay failed");
            HttpResponse::BadGateway().json(ErrorResponse {
                error: "relay_failed".to_string(),
                message: "Could not reach your partner. They may have blocked the bot.".to_string(),
                status_code: 502,
            })
        }
    }
}

/// File a report against a previous partner
///
/// POST /api/v1/events/report
async fn report(state: web::Data<AppState>, req: web::Json<ReportRequest>) -> impl Responder {
    let reporter = UserId(req.reporter_id);
    let reported = UserId(req.reported_id);

    if let Err(e) = state.reports.record(reporter, reported).await {
        return internal_error(e.to_string());
    }

    if let Some(owner) = state.owner_id {
        let text = format!(
            "⚠️ New report received\n\nReporter: {}\nReported: {}",
            reporter, reported
        );
        if let Err(e) = state.transport.notify(owner, &text).await {
            tracing::warn!(owner = %owner, error = %e, "failed to notify operator of report");
        }
    }

    HttpResponse::Ok().json(EventAck {
        success: true,
        message: "Report submitted. Thank you.".to_string(),
    })
}

/// Create or update a profile
///
/// POST /api/v1/profile
async fn upsert_profile(
    state: web::Data<AppState>,
    req: web::Json<UpsertProfileRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "validation_failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    let gender = match req.gender.as_deref() {
        None => None,
        Some(s) => match s.parse::<Gender>() {
            Ok(g) => Some(g),
            Err(_) => {
                return HttpResponse::BadRequest().json(ErrorResponse {
                    error: "invalid_gender".to_string(),
                    message: "Gender must be one of: male, female, undisclosed".to_string(),
                    status_code: 400,
                });
            }
        },
    };

    let fields = ProfileFields {
        handle: req.handle.clone(),
        gender,
        age: req.age,
        bio: req.bio.clone(),
    };

    match state.profiles.upsert(UserId(req.user_id), fields).await {
        Ok(()) => HttpResponse::Ok().json(EventAck {
            success: true,
            message: "Profile saved.".to_string(),
        }),
        Err(e) => internal_error(e.to_string()),
    }
}

/// Resolve a handle to a user id
///
/// GET /api/v1/profile/by-handle?handle={handle}
async fn profile_by_handle(
    state: web::Data<AppState>,
    query: web::Query<HandleQuery>,
) -> impl Responder {
    match state.profiles.find_by_handle(&query.handle).await {
        Ok(Some(user_id)) => HttpResponse::Ok().json(serde_json::json!({ "user_id": user_id })),
        Ok(None) => HttpResponse::NotFound().json(ErrorResponse {
            error: "not_found".to_string(),
            message: format!("No user with handle {}", query.handle),
            status_code: 404,
        }),
        Err(e) => internal_error(e.to_string()),
    }
}

/// Public statistics
///
/// GET /api/v1/stats
async fn stats(state: web::Data<AppState>) -> impl Responder {
    let total_users = match state.profiles.count_users().await {
        Ok(n) => n,
        Err(e) => return internal_error(e.to_string()),
    };
    let (waiting, chatting) = state.engine.counts().await;

    HttpResponse::Ok().json(StatsResponse {
        total_users,
        active_users: waiting + chatting,
    })
}

fn admin_guard(state: &AppState, req: &HttpRequest) -> Result<(), HttpResponse> {
    let configured = match &state.admin_token {
        Some(token) => token,
        None => {
            return Err(HttpResponse::Forbidden().json(ErrorResponse {
                error: "admin_disabled".to_string(),
                message: "No admin token is configured.".to_string(),
                status_code: 403,
            }));
        }
    };

    let presented = req
        .headers()
        .get("X-Admin-Token")
        .and_then(|v| v.to_str().ok());

    if presented != Some(configured.as_str()) {
        return Err(HttpResponse::Forbidden().json(ErrorResponse {
            error: "forbidden".to_string(),
            message: "This endpoint is for the operator only.".to_string(),
            status_code: 403,
        }));
    }
    Ok(())
}

/// Operator statistics
///
/// GET /api/v1/admin/stats
async fn admin_stats(state: web::Data<AppState>, http_req: HttpRequest) -> impl Responder {
    if let Err(resp) = admin_guard(&state, &http_req) {
        return resp;
    }

    let total_users = match state.profiles.count_users().await {
        Ok(n) => n,
        Err(e) => return internal_error(e.to_string()),
    };
    let pro_users = match state.profiles.count_pro().await {
        Ok(n) => n,
        Err(e) => return internal_error(e.to_string()),
    };
    let total_reports = match state.reports.count().await {
        Ok(n) => n,
        Err(e) => return internal_error(e.to_string()),
    };
    let (waiting, chatting) = state.engine.counts().await;

    HttpResponse::Ok().json(AdminStatsResponse {
        total_users,
        pro_users,
        chatting_users: chatting,
        waiting_users: waiting,
        total_reports,
    })
}

/// Grant or revoke pro status
///
/// POST /api/v1/admin/pro
async fn set_pro(
    state: web::Data<AppState>,
    http_req: HttpRequest,
    req: web::Json<SetProRequest>,
) -> impl Responder {
    if let Err(resp) = admin_guard(&state, &http_req) {
        return resp;
    }

    let target = match (req.user_id, req.handle.as_deref()) {
        (Some(id), _) => UserId(id),
        (None, Some(handle)) => match state.profiles.find_by_handle(handle).await {
            Ok(Some(id)) => id,
            Ok(None) => {
                return HttpResponse::NotFound().json(ErrorResponse {
                    error: "not_found".to_string(),
                    message: format!("No user with handle {}", handle),
                    status_code: 404,
                });
            }
            Err(e) => return internal_error(e.to_string()),
        },
        (None, None) => {
            return HttpResponse::BadRequest().json(ErrorResponse {
                error: "missing_target".to_string(),
                message: "Provide user_id or handle.".to_string(),
                status_code: 400,
            });
        }
    };

    if let Err(e) = state.profiles.set_pro(target, req.is_pro).await {
        return internal_error(e.to_string());
    }

    if req.is_pro {
        if let Err(e) = state
            .transport
            .notify(
                target,
                "✨ Congratulations! Your account has been upgraded to Pro.",
            )
            .await
        {
            tracing::warn!(user = %target, error = %e, "failed to send pro notice");
        }
    }

    HttpResponse::Ok().json(EventAck {
        success: true,
        message: format!("User {} pro status set to {}.", target, req.is_pro),
    })
}
