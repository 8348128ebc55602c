mod steps;

pub use donation_world::DonationWorld;
