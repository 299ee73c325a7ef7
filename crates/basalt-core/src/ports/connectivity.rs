/// Current network reachability as last observed by the platform.
pub trait ConnectivityPort: Send + Sync {
    fn is_connected(&self) -> bool;
}
