//! Membership adapters.

mod stub_membership_checker;

pub use stub_membership_checker::StubMembershipChecker;
