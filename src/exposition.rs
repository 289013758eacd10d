use std::collections::BTreeMap;

use prometheus::{Encoder, GaugeVec, Opts, Registry, TextEncoder};

use crate::metrics::MetricSample;

/// Renders one scrape into the Prometheus text format.
///
/// A fresh registry is built for every call, so series that were not
/// produced this time simply disappear from the output.
pub fn encode(samples: &[MetricSample]) -> anyhow::Result<String> {
    let registry = Registry::new();

    let mut families: BTreeMap<&str, Vec<&MetricSample>> = BTreeMap::new();
    for s in samples {
        families.entry(s.name.as_str()).or_default().push(s);
    }

    for (name, members) in families {
        let first = members[0];
        let label_names = first.label_names();
        let gauge = GaugeVec::new(Opts::new(name, first.help), &label_names)?;

        for s in members {
            let values: Vec<&str> = s.labels.iter().map(|(_, v)| v.as_str()).collect();
            gauge.get_metric_with_label_values(&values)?.set(s.value);
        }

        registry.register(Box::new(gauge))?;
    }

    let mut buf = Vec::new();
    TextEncoder::new().encode(&registry.gather(), &mut buf)?;
    Ok(String::from_utf8(buf)?)
}

pub fn content_type() -> String {
    TextEncoder::new().format_type().to_string()
}
