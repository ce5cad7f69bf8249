pub mod assignment;
pub mod event;
pub mod member;
pub mod ministry;
pub mod role;
pub mod schedule;
pub mod setting;
pub mod user;

pub use assignment::AssignmentRepository;
pub use event::EventRepository;
pub use member::MemberRepository;
pub use ministry::MinistryRepository;
pub use role::RoleRepository;
pub use schedule::{ScheduleRepository, ScheduleTypeRepository};
pub use setting::SettingRepository;
pub use user::UserRepository;
