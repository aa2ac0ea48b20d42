pub trait ObjectStore {
    fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, String>;
    fn put_object(&self, bucket: &str, key: &str, body: &[u8]) -> Result<(), String>;
}
