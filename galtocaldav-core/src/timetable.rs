use std::time::Duration;

use chrono::NaiveDate;
use reqwest::{Client, ClientBuilder, StatusCode};

use crate::{Error, RawLesson, ReceiverKind, RequestParams, Result, TimetableConfig};

/// 课表接口使用的日期格式
pub const API_DATE_FORMAT: &str = "%Y.%m.%d";

const ENDPOINT: &str = "personlessons";

pub struct TimetableFetcherBuilder {
    pub client_builder: ClientBuilder,
}

/// Galaktika `personlessons` 接口的客户端
pub struct TimetableFetcher {
    client: Client,
}

impl TimetableFetcherBuilder {
    pub fn new() -> Self {
        let client_builder = Client::builder()
            .user_agent(concat!("galtocaldav/", env!("CARGO_PKG_VERSION")))
            .default_headers({
                let mut headers = reqwest::header::HeaderMap::new();
                headers.insert(
                    reqwest::header::ACCEPT,
                    reqwest::header::HeaderValue::from_static("application/json"),
                );
                headers
            });

        Self { client_builder }
    }

    pub fn from_config(config: &TimetableConfig) -> Self {
        let mut s = Self::new();
        if let Some(timeout_secs) = config.timeout {
            s.client_builder = s.client_builder.timeout(Duration::from_secs(timeout_secs));
        }
        s
    }

    pub fn build(self) -> Result<TimetableFetcher> {
        let client = self.client_builder.build()?;
        Ok(TimetableFetcher { client })
    }
}

impl Default for TimetableFetcherBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TimetableFetcher {
    pub fn new(config: &TimetableConfig) -> Result<Self> {
        TimetableFetcherBuilder::from_config(config).build()
    }

    /// 构建查询参数
    pub fn query(params: &RequestParams) -> Vec<(&'static str, String)> {
        let id_key = match params.receiver_kind {
            ReceiverKind::Lecturer => "lecturerId",
            ReceiverKind::Group => "groupId",
        };

        vec![
            ("fromdate", format_api_date(params.from_date)),
            ("todate", format_api_date(params.to_date)),
            ("receiverType", params.receiver_kind.code().to_string()),
            (id_key, params.subject_id.to_string()),
        ]
    }

    pub fn endpoint_url(api_url: &str) -> String {
        if api_url.ends_with('/') {
            format!("{}{}", api_url, ENDPOINT)
        } else {
            format!("{}/{}", api_url, ENDPOINT)
        }
    }

    /// 获取原始课程记录，保持服务端顺序
    pub async fn fetch(&self, params: &RequestParams) -> Result<Vec<RawLesson>> {
        let url = Self::endpoint_url(&params.api_url);
        tracing::info!(
            "Fetching timetable for {} {} from {} to {}",
            params.receiver_kind,
            params.subject_id,
            params.from_date,
            params.to_date
        );

        let response = self
            .client
            .get(&url)
            .query(&Self::query(params))
            .send()
            .await
            .map_err(Error::from_request)?;

        let status = response.status();
        if status != StatusCode::OK {
            tracing::debug!("Timetable service answered {} for {}", status, url);
            return Err(Error::TimetableFetch {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(Error::from_request)?;
        let records: Vec<RawLesson> = serde_json::from_slice(&body)?;
        tracing::info!("Fetched {} timetable records", records.len());
        Ok(records)
    }
}

pub fn format_api_date(date: NaiveDate) -> String {
    date.format(API_DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path, query_param},
    };

    use super::*;

    fn params(kind: ReceiverKind, api_url: String) -> RequestParams {
        RequestParams {
            subject_id: 4242,
            receiver_kind: kind,
            from_date: NaiveDate::from_ymd_opt(2024, 5, 13).unwrap(),
            to_date: NaiveDate::from_ymd_opt(2024, 5, 19).unwrap(),
            api_url,
        }
    }

    fn sample_body() -> serde_json::Value {
        serde_json::json!([
            {
                "date": "2024.05.13",
                "beginLesson": "09:30",
                "endLesson": "11:05",
                "discipline": "Operating Systems Design",
                "kindOfWork": "Lecture",
                "auditorium": "A-101",
                "listGroups": [{"group": "CS-101"}],
                "stream": "B12",
                "subGroup": null
            },
            {
                "date": "2024.05.14",
                "beginLesson": "11:20",
                "endLesson": "12:55",
                "discipline": "Math",
                "kindOfWork": "Seminar",
                "auditorium": "B-7",
                "listGroups": [],
                "stream": null,
                "subGroup": null
            }
        ])
    }

    #[test]
    fn lecturer_query_uses_lecturer_id() {
        let query = TimetableFetcher::query(&params(ReceiverKind::Lecturer, String::new()));
        assert_eq!(
            query,
            vec![
                ("fromdate", "2024.05.13".to_string()),
                ("todate", "2024.05.19".to_string()),
                ("receiverType", "1".to_string()),
                ("lecturerId", "4242".to_string()),
            ]
        );
    }

    #[test]
    fn group_query_uses_group_id() {
        let query = TimetableFetcher::query(&params(ReceiverKind::Group, String::new()));
        assert!(query.contains(&("receiverType", "3".to_string())));
        assert!(query.contains(&("groupId", "4242".to_string())));
        assert!(!query.iter().any(|(key, _)| *key == "lecturerId"));
    }

    #[test]
    fn endpoint_url_appends_personlessons() {
        assert_eq!(
            TimetableFetcher::endpoint_url("https://ruz.example.edu/api/"),
            "https://ruz.example.edu/api/personlessons"
        );
        assert_eq!(
            TimetableFetcher::endpoint_url("https://ruz.example.edu/api"),
            "https://ruz.example.edu/api/personlessons"
        );
    }

    #[tokio::test]
    async fn fetch_returns_records_in_service_order() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/personlessons"))
            .and(query_param("fromdate", "2024.05.13"))
            .and(query_param("todate", "2024.05.19"))
            .and(query_param("receiverType", "3"))
            .and(query_param("groupId", "4242"))
            .respond_with(ResponseTemplate::new(200).set_body_json(sample_body()))
            .expect(1)
            .mount(&server)
            .await;

        let fetcher = TimetableFetcher::new(&TimetableConfig::default()).unwrap();
        let records = fetcher
            .fetch(&params(ReceiverKind::Group, format!("{}/api/", server.uri())))
            .await
            .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].discipline, "Operating Systems Design");
        assert_eq!(records[0].list_groups[0].group, "CS-101");
        assert_eq!(records[1].discipline, "Math");
    }

    #[tokio::test]
    async fn non_200_status_is_a_fetch_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/personlessons"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let fetcher = TimetableFetcher::new(&TimetableConfig::default()).unwrap();
        let result = fetcher
            .fetch(&params(ReceiverKind::Lecturer, server.uri()))
            .await;

        assert!(matches!(result, Err(Error::TimetableFetch { status: 500 })));
    }

    #[tokio::test]
    async fn non_array_body_is_a_json_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"error": "nope"})),
            )
            .mount(&server)
            .await;

        let fetcher = TimetableFetcher::new(&TimetableConfig::default()).unwrap();
        let result = fetcher
            .fetch(&params(ReceiverKind::Lecturer, server.uri()))
            .await;

        assert!(matches!(result, Err(Error::Json(_))));
    }
}
