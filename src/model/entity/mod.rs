mod user;
pub use user::{UserEntity, UserEntityCreateUpdate};

mod student;
pub use student::{Student, StudentCreateUpdate};

mod course;
pub use course::{Course, CourseCreateUpdate, CourseDetailRow};

mod course_module;
pub use course_module::{CourseModule, CourseModuleCreateUpdate};

mod lesson;
pub use lesson::{Lesson, LessonCreateUpdate};

mod registration;
pub use registration::{Registration, RegistrationFilter, RegistrationStatus};

mod enrollment;
pub use enrollment::{Enrollment, EnrollmentWithCourseRow};

mod progress;
pub use progress::{LessonProgress, StudentProgress};
