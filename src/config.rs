use std::env;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expiration_hours: i64,
    pub server_host: String,
    pub server_port: u16,
    /// Base URL used to build password-reset links sent by email.
    pub frontend_url: String,
    pub support_email: String,
    pub smtp_server: String,
    pub smtp_port: u16,
    pub email_user: String,
    pub email_pass: String,
    pub media_api_url: String,
    pub media_cloud_name: String,
    pub media_api_key: String,
    pub upload_dir: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            database_url: env::var("DATABASE_URL")
                .expect("DATABASE_URL must be set"),
            jwt_secret: env::var("JWT_SECRET")
                .expect("JWT_SECRET must be set"),
            jwt_expiration_hours: env::var("JWT_EXPIRATION_HOURS")
                .unwrap_or_else(|_| "168".to_string())
                .parse()
                .expect("JWT_EXPIRATION_HOURS must be a number"),
            server_host: env::var("SERVER_HOST")
                .unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "5000".to_string())
                .parse()
                .expect("SERVER_PORT must be a number"),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            support_email: env::var("SUPPORT_EMAIL")
                .unwrap_or_else(|_| "support@yourdomain.com".to_string()),
            smtp_server: env::var("SMTP_SERVER")
                .unwrap_or_else(|_| "smtp.gmail.com".to_string()),
            smtp_port: env::var("SMTP_PORT")
                .unwrap_or_else(|_| "587".to_string())
                .parse()
                .expect("SMTP_PORT must be a number"),
            email_user: env::var("EMAIL_USER").unwrap_or_default(),
            email_pass: env::var("EMAIL_PASS").unwrap_or_default(),
            media_api_url: env::var("MEDIA_API_URL")
                .unwrap_or_else(|_| "https://api.cloudinary.com".to_string()),
            media_cloud_name: env::var("MEDIA_CLOUD_NAME").unwrap_or_default(),
            media_api_key: env::var("MEDIA_API_KEY").unwrap_or_default(),
            upload_dir: env::var("UPLOAD_DIR")
                .unwrap_or_else(|_| "uploads".to_string()),
        }
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}
