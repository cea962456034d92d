use instant::Instant;

pub fn elapsed_seconds(since: Instant) -> f64 {
    let dt = since.elapsed();
    (dt.as_secs() as f64) + (f64::from(dt.subsec_nanos()) * 1e-9)
}

struct TimerSpan {
    name: String,
    started_at: Instant,
    nested_results: Vec<String>,
}

/// Hierarchial timing of pipeline phases. Notes and warnings are logged immediately and repeated
/// in a summary when the Timer is dropped, so nothing interesting scrolls away.
pub struct Timer {
    results: Vec<String>,
    stack: Vec<TimerSpan>,
    outermost_name: String,

    notes: Vec<String>,
    warnings: Vec<String>,
}

impl Timer {
    pub fn new<I: Into<String>>(raw_name: I) -> Timer {
        let name = raw_name.into();
        let mut t = Timer {
            results: Vec::new(),
            stack: Vec::new(),
            outermost_name: name.clone(),
            notes: Vec::new(),
            warnings: Vec::new(),
        };
        t.start(name);
        t
    }

    // TODO Shouldn't use this much.
    pub fn throwaway() -> Timer {
        Timer::new("throwaway")
    }

    pub fn note<I: Into<String>>(&mut self, raw_line: I) {
        let line = raw_line.into();
        info!("{}", line);
        self.notes.push(line);
    }

    pub fn warn<I: Into<String>>(&mut self, raw_line: I) {
        let line = raw_line.into();
        warn!("{}", line);
        self.warnings.push(line);
    }

    pub fn num_warnings(&self) -> usize {
        self.warnings.len()
    }

    pub fn start<I: Into<String>>(&mut self, raw_name: I) {
        let name = raw_name.into();
        info!("{}...", name);
        self.stack.push(TimerSpan {
            name,
            started_at: Instant::now(),
            nested_results: Vec::new(),
        });
    }

    pub fn stop<I: Into<String>>(&mut self, raw_name: I) {
        let name = raw_name.into();
        let span = match self.stack.pop() {
            Some(span) => span,
            None => {
                warn!("Timer::stop({}) called with nothing started", name);
                return;
            }
        };
        if span.name != name {
            warn!("Timer::stop({}) doesn't match the open span {}", name, span.name);
        }
        let line = format!(
            "{} took {}",
            span.name,
            prettyprint_time(elapsed_seconds(span.started_at))
        );

        let padding = "  ".repeat(self.stack.len());
        match self.stack.last_mut() {
            Some(parent) => {
                parent.nested_results.push(format!("{}- {}", padding, line));
                parent.nested_results.extend(span.nested_results);
            }
            None => {
                self.results.push(format!("{}- {}", padding, line));
                self.results.extend(span.nested_results);
            }
        }
        debug!("{}", line);
    }
}

impl std::ops::Drop for Timer {
    fn drop(&mut self) {
        if std::thread::panicking() {
            return;
        }
        let stop_name = self.outermost_name.clone();
        while self.stack.len() > 1 {
            let name = self.stack.last().map(|s| s.name.clone()).unwrap_or_default();
            self.stop(name);
        }
        self.stop(stop_name);

        for line in &self.results {
            info!("{}", line);
        }
        if !self.notes.is_empty() {
            info!("{} notes:", self.notes.len());
            for line in &self.notes {
                info!("{}", line);
            }
        }
        if !self.warnings.is_empty() {
            warn!("{} warnings:", self.warnings.len());
            for line in &self.warnings {
                warn!("{}", line);
            }
        }
    }
}

pub fn prettyprint_usize(x: usize) -> String {
    let num = format!("{}", x);
    let mut result = String::new();
    let mut i = num.len();
    for c in num.chars() {
        result.push(c);
        i -= 1;
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
    }
    result
}

fn prettyprint_time(seconds: f64) -> String {
    format!("{:.4}s", seconds)
}
