pub mod daily_meal;
pub mod like;
pub mod meal;
pub mod meal_menu;
pub mod member;
pub mod menu;
pub mod review;

pub use daily_meal::Entity as DailyMeal;
pub use like::Entity as Like;
pub use meal::Entity as Meal;
pub use meal_menu::Entity as MealMenu;
pub use member::Entity as Member;
pub use menu::Entity as Menu;
pub use review::Entity as Review;
