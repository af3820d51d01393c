use serde::Deserialize;

use crate::domain::{MESSAGE_DATE_FORMAT, MessagesPage, MessagesQuery};

use super::record::MessageRecordJson;
use super::WireError;

#[derive(Debug, Clone, Deserialize)]
struct MessagesJsonResponse {
    data: MessagesPageJson,
}

#[derive(Debug, Clone, Deserialize)]
struct MessagesPageJson {
    current_page: u32,
    per_page: u32,
    last_page: u32,
    from: u32,
    to: u32,
    total: u64,
    result: Vec<MessageRecordJson>,
}

/// Encode the history query. The gateway reads these from the request body even
/// on GET; the `status` filter additionally rides on the query string, which the
/// client appends to the path.
pub fn encode_messages_query_form(query: &MessagesQuery) -> Vec<(String, String)> {
    let options = query.options();
    let mut params = vec![
        (
            "start_date".to_owned(),
            query.start().format(MESSAGE_DATE_FORMAT).to_string(),
        ),
        (
            "end_date".to_owned(),
            query.end().format(MESSAGE_DATE_FORMAT).to_string(),
        ),
        (
            "page_size".to_owned(),
            options.page_size.unwrap_or(20).to_string(),
        ),
        (
            "count".to_owned(),
            if options.count { "1" } else { "0" }.to_owned(),
        ),
        (
            "is_ad".to_owned(),
            match options.is_ad {
                Some(true) => "1",
                Some(false) => "0",
                None => "",
            }
            .to_owned(),
        ),
    ];
    if let Some(status) = options.status.as_deref() {
        params.push(("status".to_owned(), status.to_owned()));
    }
    params
}

/// Decode one page of `GET /api/message/sms/get-user-messages`.
pub fn decode_messages_page_response(json: &str) -> Result<MessagesPage, WireError> {
    let parsed: MessagesJsonResponse = serde_json::from_str(json)?;
    let data = parsed.data;
    Ok(MessagesPage {
        current_page: data.current_page,
        per_page: data.per_page,
        last_page: data.last_page,
        from: data.from,
        to: data.to,
        total: data.total,
        result: data
            .result
            .into_iter()
            .map(MessageRecordJson::into_domain)
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use crate::domain::MessagesQueryOptions;

    use super::*;

    fn query(options: MessagesQueryOptions) -> MessagesQuery {
        let start = NaiveDate::from_ymd_opt(2023, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let end = NaiveDate::from_ymd_opt(2023, 1, 31)
            .unwrap()
            .and_hms_opt(23, 59, 0)
            .unwrap();
        MessagesQuery::new(start, end, options).unwrap()
    }

    #[test]
    fn encode_query_defaults() {
        let params = encode_messages_query_form(&query(MessagesQueryOptions::default()));
        assert_eq!(
            params,
            vec![
                ("start_date".to_owned(), "2023-01-01 00:00".to_owned()),
                ("end_date".to_owned(), "2023-01-31 23:59".to_owned()),
                ("page_size".to_owned(), "20".to_owned()),
                ("count".to_owned(), "0".to_owned()),
                ("is_ad".to_owned(), "".to_owned()),
            ]
        );
    }

    #[test]
    fn encode_query_with_all_options() {
        let params = encode_messages_query_form(&query(MessagesQueryOptions {
            page_size: Some(50),
            count: true,
            is_ad: Some(false),
            status: Some("delivered".to_owned()),
        }));
        assert!(params.iter().any(|(k, v)| k == "page_size" && v == "50"));
        assert!(params.iter().any(|(k, v)| k == "count" && v == "1"));
        assert!(params.iter().any(|(k, v)| k == "is_ad" && v == "0"));
        assert!(params.iter().any(|(k, v)| k == "status" && v == "delivered"));
    }

    #[test]
    fn decode_messages_page() {
        let json = r#"
        {
          "data": {
            "current_page": 1,
            "path": "/api/message/sms/get-user-messages",
            "prev_page_url": null,
            "first_page_url": "/api/message/sms/get-user-messages?page=1",
            "last_page_url": "/api/message/sms/get-user-messages?page=1",
            "next_page_url": null,
            "per_page": 20,
            "last_page": 1,
            "from": 1,
            "to": 2,
            "total": 2,
            "result": [
              {
                "id": 1,
                "user_id": 1,
                "country_id": null,
                "connection_id": 1,
                "smsc_id": 1,
                "dispatch_id": null,
                "user_sms_id": null,
                "request_id": "abc123",
                "price": 10,
                "total_price": 10,
                "is_ad": false,
                "nick": "4546",
                "to": "998901234567",
                "message": "Test message 1",
                "encoding": 0,
                "parts_count": 1,
                "parts": {},
                "status": "delivered",
                "smsc_data": {},
                "template_tag": null,
                "sent_at": "2023-01-01 12:00:00",
                "submit_sm_resp_at": "2023-01-01 12:00:01",
                "delivery_sm_at": "2023-01-01 12:00:02",
                "created_at": "2023-01-01 12:00:00",
                "updated_at": "2023-01-01 12:00:02"
              },
              {
                "id": 2,
                "user_id": 1,
                "country_id": null,
                "connection_id": 1,
                "smsc_id": 1,
                "dispatch_id": null,
                "user_sms_id": null,
                "request_id": "def456",
                "price": 10,
                "total_price": 10,
                "is_ad": false,
                "nick": "4546",
                "to": "998901234568",
                "message": "Test message 2",
                "encoding": 0,
                "parts_count": 1,
                "parts": {},
                "status": "delivered",
                "smsc_data": {},
                "template_tag": null,
                "sent_at": "2023-01-02 12:00:00",
                "submit_sm_resp_at": "2023-01-02 12:00:01",
                "delivery_sm_at": "2023-01-02 12:00:02",
                "created_at": "2023-01-02 12:00:00",
                "updated_at": "2023-01-02 12:00:02"
              }
            ],
            "links": []
          },
          "status": "success"
        }
        "#;

        let page = decode_messages_page_response(json).unwrap();
        assert_eq!(page.current_page, 1);
        assert_eq!(page.total, 2);
        assert_eq!(page.result.len(), 2);
        assert_eq!(page.result[0].id, "1");
        assert_eq!(page.result[1].request_id, "def456");
        assert_eq!(page.result[1].to, "998901234568");
    }
}
