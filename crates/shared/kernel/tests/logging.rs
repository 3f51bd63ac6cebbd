use parking_lot::Mutex;
use settle_kernel::prelude::*;
use std::io;
use std::sync::Arc;
use tracing::Level;

#[derive(Clone, Default)]
struct Capture(Arc<Mutex<Vec<u8>>>);

impl io::Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Capture {
    fn output(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }
}

fn captured<R>(f: impl FnOnce() -> R) -> (R, String) {
    let capture = Capture::default();
    let writer = capture.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();

    let result = tracing::subscriber::with_default(subscriber, f);
    (result, capture.output())
}

#[test]
fn rejection_logs_the_violation_codes() {
    let mut model = Model::new("Test.logged");
    model.option("name").unwrap().validate(|s, errors| {
        if s.get_as::<String>("name")?.is_empty() {
            errors.add("name_present");
        }
        Ok(())
    });

    let (result, output) = captured(|| model.build(Input::new().with("name", "")));

    assert!(result.unwrap_err().is_validation_error());
    let line = output.lines().find(|line| line.contains("settings rejected")).unwrap();
    assert!(line.contains(r#"codes=["name_present"]"#), "{line}");
}

#[test]
fn declarations_log_their_keys() {
    let (_, output) = captured(|| {
        let mut model = Model::new("Test.logged");
        model.option(OptionDef::new("user").rename("customer")).unwrap();
    });

    assert!(output.contains("declaring option"), "{output}");
    assert!(output.contains("key=\"user\""), "{output}");
}
