//! Admin session handling on top of the signed cookie session.
//!
//! The cookie holds only the operator name. Handlers never touch the raw
//! session; they ask [`SessionContext`] for an [`AdminContext`] and get a
//! `401` error when there is none.

use actix_session::{Session, SessionExt as _};
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::{Ready, ready};

use crate::domain::{AdminContext, Error};

pub(crate) const ADMIN_OPERATOR_KEY: &str = "admin_operator";

/// Session extractor exposing admin login state.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Wrap an Actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Start an admin session, rotating the cookie first.
    pub fn persist_admin(&self, admin: &AdminContext) -> Result<(), Error> {
        self.0.renew();
        self.0
            .insert(ADMIN_OPERATOR_KEY, admin.operator())
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// Admin context restored from the cookie, if one is present and valid.
    pub fn admin(&self) -> Result<Option<AdminContext>, Error> {
        let stored = self
            .0
            .get::<String>(ADMIN_OPERATOR_KEY)
            .map_err(|error| Error::internal(format!("failed to read session: {error}")))?;
        Ok(stored.and_then(|operator| {
            let restored = AdminContext::restore(&operator);
            if restored.is_none() {
                tracing::warn!("ignoring blank operator in session cookie");
            }
            restored
        }))
    }

    /// Admin context, or `401 Unauthorized` when nobody is logged in.
    pub fn require_admin(&self) -> Result<AdminContext, Error> {
        self.admin()?
            .ok_or_else(|| Error::unauthorized("admin login required"))
    }

    /// End the admin session and expire the cookie.
    pub fn purge(&self) {
        self.0.purge();
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Ok(Self::new(req.get_session())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AdminGate, LoginCredentials};
    use crate::inbound::http::test_utils::{session_cookie, test_session_middleware};
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test, web};
    use rstest::rstest;

    async fn login(session: SessionContext) -> Result<HttpResponse, Error> {
        let credentials = LoginCredentials::try_from_parts("ops", "secret").expect("valid");
        session.persist_admin(&AdminGate.login(&credentials))?;
        Ok(HttpResponse::Ok().finish())
    }

    async fn plant_blank(session: Session) -> HttpResponse {
        session
            .insert(ADMIN_OPERATOR_KEY, "   ")
            .expect("insert blank operator");
        HttpResponse::Ok().finish()
    }

    async fn whoami(session: SessionContext) -> Result<HttpResponse, Error> {
        let admin = session.require_admin()?;
        Ok(HttpResponse::Ok().body(admin.operator().to_owned()))
    }

    async fn logout(session: SessionContext) -> HttpResponse {
        session.purge();
        HttpResponse::NoContent().finish()
    }

    #[rstest]
    #[case::logged_in("/login", StatusCode::OK)]
    #[case::blank_operator("/plant-blank", StatusCode::UNAUTHORIZED)]
    #[actix_web::test]
    async fn whoami_reflects_the_cookie(#[case] setup: &str, #[case] expected: StatusCode) {
        let app = test::init_service(
            App::new()
                .wrap(test_session_middleware())
                .route("/login", web::post().to(login))
                .route("/plant-blank", web::post().to(plant_blank))
                .route("/whoami", web::get().to(whoami)),
        )
        .await;

        let setup_res =
            test::call_service(&app, test::TestRequest::post().uri(setup).to_request()).await;
        let cookie = session_cookie(&setup_res);
        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/whoami")
                .cookie(cookie)
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), expected);
        if expected == StatusCode::OK {
            assert_eq!(test::read_body(res).await, "ops");
        }
    }

    #[rstest]
    #[actix_web::test]
    async fn no_cookie_and_purged_cookie_are_unauthorised() {
        let app = test::init_service(
            App::new()
                .wrap(test_session_middleware())
                .route("/login", web::post().to(login))
                .route("/logout", web::post().to(logout))
                .route("/whoami", web::get().to(whoami)),
        )
        .await;

        let anonymous =
            test::call_service(&app, test::TestRequest::get().uri("/whoami").to_request()).await;
        assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

        let login_res =
            test::call_service(&app, test::TestRequest::post().uri("/login").to_request()).await;
        let logout_res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/logout")
                .cookie(session_cookie(&login_res))
                .to_request(),
        )
        .await;
        assert_eq!(logout_res.status(), StatusCode::NO_CONTENT);

        let after = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/whoami")
                .cookie(session_cookie(&logout_res))
                .to_request(),
        )
        .await;
        assert_eq!(after.status(), StatusCode::UNAUTHORIZED);
    }
}
