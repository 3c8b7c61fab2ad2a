use serde_json::{json, Value};

use shared_config::AppConfig;

pub struct TestConfig {
    pub backend_url: String,
    pub api_token: Option<String>,
    pub request_timeout_secs: u64,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:8080".to_string(),
            api_token: Some("test-api-token".to_string()),
            request_timeout_secs: 5,
        }
    }
}

impl TestConfig {
    /// Config pointing at a wiremock server.
    pub fn for_server(uri: &str) -> Self {
        Self {
            backend_url: uri.to_string(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            backend_url: self.backend_url.clone(),
            api_token: self.api_token.clone(),
            request_timeout_secs: self.request_timeout_secs,
        }
    }
}

pub struct MockBackendResponses;

impl MockBackendResponses {
    /// Day availability payload; each entry is `(horario, disponivel)`.
    pub fn slots_response(slots: &[(&str, bool)]) -> Value {
        let data: Vec<Value> = slots
            .iter()
            .map(|(time, available)| json!({ "horario": time, "disponivel": available }))
            .collect();

        json!({
            "success": true,
            "data": data,
            "error": null,
            "meta": null,
            "message": "OK"
        })
    }

    pub fn error_response(message: &str) -> Value {
        json!({
            "success": false,
            "data": null,
            "error": "Bad Request",
            "meta": null,
            "message": message
        })
    }

    pub fn not_working_day_response() -> Value {
        Self::error_response("O médico não atende neste dia da semana")
    }

    pub fn outside_business_hours_response() -> Value {
        Self::error_response("Data fora do expediente do médico")
    }

    pub fn appointment_response(id: &str, doctor_id: &str, time: &str, status: &str) -> Value {
        json!({
            "idAgendamento": id,
            "colaborador": { "id": "col-1", "nome": "Ana Souza" },
            "dependente": null,
            "medico": { "id": doctor_id, "nome": "Dr. Carlos Lima" },
            "horario": time,
            "status": status
        })
    }

    pub fn appointments_response(appointments: Vec<Value>) -> Value {
        json!({
            "success": true,
            "data": appointments,
            "error": null,
            "meta": null,
            "message": "OK"
        })
    }

    pub fn empty_success() -> Value {
        json!({
            "success": true,
            "data": null,
            "error": null,
            "meta": null,
            "message": "OK"
        })
    }
}
