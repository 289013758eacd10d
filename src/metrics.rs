use tokio::sync::mpsc;

/// One gauge value produced during a scrape.
///
/// Samples are created fresh on every scrape, consumed once by the
/// exposition encoder and then dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSample {
    /// Fully qualified family name, coin prefix included
    pub name: String,

    pub help: &'static str,

    /// Ordered label pairs; every sample of a family uses the same keys
    pub labels: Vec<(&'static str, String)>,

    pub value: f64,
}

impl MetricSample {
    pub fn gauge(coin: &str, suffix: &str, help: &'static str, value: f64) -> Self {
        Self {
            name: format!("{}_{}", coin, suffix),
            help,
            labels: Vec::new(),
            value,
        }
    }

    pub fn with_label(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.labels.push((key, value.into()));
        self
    }

    #[cfg(test)]
    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn label_names(&self) -> Vec<&'static str> {
        self.labels.iter().map(|(k, _)| *k).collect()
    }
}

/// Shape of one metric family, as declared to the scraper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FamilyDesc {
    pub name: String,
    pub help: &'static str,
    pub label_names: Vec<&'static str>,
}

/// Write half of the per-scrape sample buffer.
///
/// Backed by a bounded channel: producers wait when the buffer is
/// full, so memory stays flat however many coins are configured.
/// Cloned into every collector task of one scrape.
#[derive(Clone)]
pub struct SampleSink {
    tx: mpsc::Sender<MetricSample>,
}

impl SampleSink {
    /// Creates a sink and the receiver that drains it.
    pub fn bounded(capacity: usize) -> (Self, mpsc::Receiver<MetricSample>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }

    pub async fn emit(&self, sample: MetricSample) {
        // The receiver only goes away when the scrape was abandoned.
        let _ = self.tx.send(sample).await;
    }

    pub async fn emit_all(&self, samples: Vec<MetricSample>) {
        for sample in samples {
            self.emit(sample).await;
        }
    }
}
