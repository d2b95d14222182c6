//! Conversion of scrape outcomes to the Prometheus text format

use crate::collector::ScrapeOutcome;
use crate::registry::{MetricRegistry, Sample, ValueKind};
use prometheus::core::Desc;
use prometheus::proto::{Counter, Gauge, LabelPair, Metric, MetricFamily, MetricType};
use prometheus::{Encoder, TextEncoder};
use std::collections::HashMap;

/// Content type of [`encode_text`] output
pub const CONTENT_TYPE: &str = prometheus::TEXT_FORMAT;

/// Check every registry descriptor against the Prometheus naming rules
pub fn validate_descriptors(registry: &MetricRegistry) -> prometheus::Result<Vec<Desc>> {
    registry
        .describe()
        .map(|d| {
            Desc::new(
                d.fq_name.clone(),
                d.help.clone(),
                d.label_names.clone(),
                HashMap::new(),
            )
        })
        .collect()
}

/// Group samples into metric families, in order of first appearance
pub fn metric_families(outcome: &ScrapeOutcome) -> Vec<MetricFamily> {
    let mut families: Vec<MetricFamily> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for sample in &outcome.samples {
        let name = sample.descriptor.fq_name.as_str();
        let slot = *index.entry(name).or_insert_with(|| {
            families.push(new_family(sample));
            families.len() - 1
        });
        families[slot].mut_metric().push(to_metric(sample));
    }

    families
}

/// Render an outcome, followed by `extra` families, as text
pub fn encode_text(outcome: &ScrapeOutcome, extra: &[MetricFamily]) -> prometheus::Result<String> {
    let mut families = metric_families(outcome);
    families.extend_from_slice(extra);

    let mut buffer = Vec::new();
    TextEncoder::new().encode(&families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}

fn new_family(sample: &Sample) -> MetricFamily {
    let mut family = MetricFamily::default();
    family.set_name(sample.descriptor.fq_name.clone());
    family.set_help(sample.descriptor.help.clone());
    family.set_field_type(match sample.descriptor.kind {
        ValueKind::Gauge => MetricType::GAUGE,
        ValueKind::Counter => MetricType::COUNTER,
    });
    family
}

fn to_metric(sample: &Sample) -> Metric {
    let mut metric = Metric::default();
    for (name, value) in sample
        .descriptor
        .label_names
        .iter()
        .zip(&sample.label_values)
    {
        let mut pair = LabelPair::default();
        pair.set_name(name.clone());
        pair.set_value(value.clone());
        metric.mut_label().push(pair);
    }

    match sample.descriptor.kind {
        ValueKind::Gauge => {
            let mut gauge = Gauge::default();
            gauge.set_value(sample.value);
            metric.set_gauge(gauge);
        }
        ValueKind::Counter => {
            let mut counter = Counter::default();
            counter.set_value(sample.value);
            metric.set_counter(counter);
        }
    }
    metric
}
