use middleware::ip::IpRateLimiter;

pub mod middleware {
    pub mod ip;
}

pub fn middleware(permits_per_sec: u32) -> IpRateLimiter {
    IpRateLimiter::new(permits_per_sec)
}
