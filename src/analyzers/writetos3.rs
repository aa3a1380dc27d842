use aws_sdk_s3::primitives::ByteStream;
use flate2::Compression;
use flate2::write::GzEncoder;
use serde::Serialize;
use std::io::Write;

/// Serializes a value to JSON and uploads it to an S3 bucket with
/// `application/json` content type, optionally gzip-compressed.
pub async fn write_json_to_s3(
    client: &aws_sdk_s3::Client,
    bucket: &str,
    key: &str,
    value: &impl Serialize,
    gzip: bool,
) -> anyhow::Result<()> {
    let body = serde_json::to_vec(value)?;

    let request = client
        .put_object()
        .bucket(bucket)
        .content_type("application/json");

    let request = if gzip {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&body)?;
        request
            .key(format!("{key}.gz"))
            .content_encoding("gzip")
            .body(ByteStream::from(encoder.finish()?))
    } else {
        request.key(key).body(ByteStream::from(body))
    };

    request.send().await?;

    Ok(())
}

/// S3 object key for a report over `filter`.
pub fn report_key(filter: &crate::normalize::DimensionFilter) -> String {
    use crate::normalize::Dimension;

    match filter.selection() {
        None => "reports/dashboard.json".to_string(),
        Some((Dimension::River, value)) => format!("reports/river={}/dashboard.json", value),
        Some((Dimension::Method, value)) => format!("reports/method={}/dashboard.json", value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::DimensionFilter;

    #[test]
    fn test_report_key() {
        assert_eq!(report_key(&DimensionFilter::All), "reports/dashboard.json");
        assert_eq!(
            report_key(&DimensionFilter::river("Qinhuai")),
            "reports/river=Qinhuai/dashboard.json"
        );
        assert_eq!(
            report_key(&DimensionFilter::method(None)),
            "reports/method=Other/dashboard.json"
        );
    }
}
