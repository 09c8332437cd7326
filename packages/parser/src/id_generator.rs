use crc32fast::Hasher;

/// Generate document ID from file path using CRC32
pub fn get_document_id(path: &str) -> String {
    let mut buff = String::from(path);
    if !path.starts_with("file://") {
        buff = format!("file://{}", buff);
    }

    let mut hasher = Hasher::new();
    hasher.update(buff.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Sequential ID generator for AST nodes within a document
#[derive(Clone)]
pub struct IDGenerator {
    seed: String,
    count: u32,
}

impl IDGenerator {
    pub fn new(path: &str) -> Self {
        Self {
            seed: get_document_id(path),
            count: 0,
        }
    }

    pub fn from_seed(seed: String) -> Self {
        Self { seed, count: 0 }
    }

    /// Generate next sequential ID
    pub fn new_id(&mut self) -> String {
        self.count += 1;
        format!("{}-{}", self.seed, self.count)
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_id_is_stable_for_path() {
        let a = get_document_id("src/App.tsx");
        let b = get_document_id("file://src/App.tsx");
        assert_eq!(a, b);
    }

    #[test]
    fn ids_are_sequential() {
        let mut gen = IDGenerator::new("src/App.tsx");
        let first = gen.new_id();
        let second = gen.new_id();
        assert!(first.ends_with("-1"));
        assert!(second.ends_with("-2"));
        assert_eq!(first.split('-').next(), second.split('-').next());
    }
}
