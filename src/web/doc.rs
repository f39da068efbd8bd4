use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

pub struct BearerAuthModifier;

impl Modify for BearerAuthModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(schema) = openapi.components.as_mut() {
            schema.add_security_scheme(
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
        crate::web::routes::auth::login_handler,
        crate::web::routes::auth::profile_get_handler,
        crate::web::routes::auth::profile_update_handler,
        crate::web::routes::auth::change_password_handler,
        crate::web::routes::registrations::registration_create_handler,
        crate::web::routes::registrations::registration_list_handler,
        crate::web::routes::registrations::registration_action_handler,
        crate::web::routes::students::dashboard_handler,
        crate::web::routes::students::student_detail_handler,
        crate::web::routes::courses::course_list_handler,
        crate::web::routes::courses::course_detail_handler,
        crate::web::routes::courses::course_create_handler,
        crate::web::routes::courses::course_update_handler,
        crate::web::routes::courses::course_delete_handler,
        crate::web::routes::lessons::lesson_complete_handler,
    ),
    modifiers(&BearerAuthModifier),
)]
pub struct ApiDoc;
