/// A benchmark input read from `resources/`, one entry per line.
#[derive(Debug, Copy, Clone)]
pub struct Fixture {
    file_name: &'static str,
    content: &'static str,
}

impl Fixture {
    pub const fn new(file_name: &'static str, content: &'static str) -> Self {
        Self { file_name, content }
    }

    pub fn file_name(&self) -> &'static str {
        self.file_name
    }

    pub fn content(&self) -> &'static str {
        self.content
    }

    /// Non-empty lines, trailing whitespace removed.
    pub fn lines(&self) -> impl Iterator<Item = &'static str> {
        self.content.lines().map(str::trim_end).filter(|line| !line.is_empty())
    }

    /// Lines of the form `Name: value`, split at the first colon.
    pub fn header_lines(&self) -> Vec<(&'static str, &'static str)> {
        self.lines().filter_map(|line| line.split_once(':')).map(|(name, value)| (name, value.trim_start())).collect()
    }
}

#[derive(Debug, Copy, Clone)]
pub struct TestCase {
    name: &'static str,
    fixture: Fixture,
}

impl TestCase {
    pub fn new(name: &'static str, fixture: Fixture) -> Self {
        Self { name, fixture }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn fixture(&self) -> &Fixture {
        &self.fixture
    }

    pub fn len(&self) -> u64 {
        self.fixture.content.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.fixture.content.is_empty()
    }
}
