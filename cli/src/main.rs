use clap::{Parser, Subcommand};
use rollcall::model::entity::{
    Course,
    CourseCreateUpdate,
    CourseModule,
    CourseModuleCreateUpdate,
    Lesson,
    LessonCreateUpdate,
    UserEntity,
    UserEntityCreateUpdate,
};
use rollcall::model::{CrudRepository, DatabaseError, DbConnection, ModelManager};
use rollcall::web::AuthenticatedUser;

#[derive(Parser, Debug)]
#[command(about = "CLI tool for filling the course DB", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage users
    User {
        #[command(subcommand)]
        action: UserCommands,
    },

    /// Manage courses
    Course {
        #[command(subcommand)]
        action: CourseCommands,
    },

    /// Manage course modules
    Module {
        #[command(subcommand)]
        action: ModuleCommands,
    },

    /// Manage lessons
    Lesson {
        #[command(subcommand)]
        action: LessonCommands,
    },
}

/// User management
#[derive(Subcommand, Debug)]
pub enum UserCommands {
    Add {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long, default_value = "admin")]
        role: String,
    },
}

/// Course management
#[derive(Subcommand, Debug)]
pub enum CourseCommands {
    Add {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        /// YYYY-MM-DD
        #[arg(long)]
        start_date: String,
        /// YYYY-MM-DD
        #[arg(long)]
        end_date: String,
    },
}

/// Module management
#[derive(Subcommand, Debug)]
pub enum ModuleCommands {
    Add {
        /// Course title to attach the module to
        #[arg(long)]
        course_title: String,
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value_t = 0)]
        order_index: i32,
    },
}

/// Lesson management
#[derive(Subcommand, Debug)]
pub enum LessonCommands {
    Add {
        /// Module title to attach the lesson to
        #[arg(long)]
        module_title: String,
        #[arg(long)]
        title: String,
        /// Path to a Markdown file with lesson content
        #[arg(long)]
        file: String,
        #[arg(long, default_value_t = 0)]
        order_index: i32,
    },
}

#[tokio::main]
async fn main() -> rollcall::error::AppResult<()> {
    let _ = dotenvy::dotenv();
    let args = Cli::parse();

    let db_con = DbConnection::connect(&std::env::var("DATABASE_URL").unwrap())?;
    let mm = ModelManager::new(db_con);
    let actor = AuthenticatedUser::admin();

    match args.command {
        Commands::User { action } => match action {
            UserCommands::Add { email, password, role } => {
                let user = UserEntity::create(
                    &mm,
                    &actor,
                    UserEntityCreateUpdate {
                        email,
                        password_hash: Some(rollcall::auth::hash_password(&password).unwrap()),
                        role,
                        status: String::from("active"),
                    },
                )
                .await?;
                println!("User created: {:?}", user);
            }
        },

        Commands::Course { action } => match action {
            CourseCommands::Add { title, description, start_date, end_date } => {
                let course = Course::create(
                    &mm,
                    &actor,
                    CourseCreateUpdate {
                        title,
                        description,
                        start_date: start_date.parse().unwrap(),
                        end_date: end_date.parse().unwrap(),
                    },
                )
                .await?;
                println!("Course created: {:?}", course);
            }
        },

        Commands::Module { action } => match action {
            ModuleCommands::Add { course_title, title, description, order_index } => {
                let course_id: uuid::Uuid = sqlx::query_scalar("SELECT id FROM courses WHERE title = $1")
                    .bind(&course_title)
                    .fetch_one(mm.executor())
                    .await
                    .map_err(|e| DatabaseError::SqlxError(e))?;

                let module = CourseModule::create(
                    &mm,
                    &actor,
                    CourseModuleCreateUpdate {
                        course_id,
                        title,
                        description,
                        order_index: Some(order_index),
                    },
                )
                .await?;
                println!("Module created: {:?}", module);
            }
        },

        Commands::Lesson { action } => match action {
            LessonCommands::Add { module_title, title, file, order_index } => {
                let module_id: uuid::Uuid = sqlx::query_scalar("SELECT id FROM course_modules WHERE title = $1")
                    .bind(&module_title)
                    .fetch_one(mm.executor())
                    .await
                    .map_err(|e| DatabaseError::SqlxError(e))?;

                let content = std::fs::read_to_string(file)?;
                let lesson = Lesson::create(
                    &mm,
                    &actor,
                    LessonCreateUpdate {
                        module_id,
                        title,
                        content,
                        order_index: Some(order_index),
                    },
                )
                .await?;
                println!("Lesson created: {:?}", lesson);
            }
        },
    }

    Ok(())
}
